//! # Logging subscriber backed by `tracing`.
//!
//! [`LogWriter`] turns every lifecycle event into one `tracing` record with
//! structured fields (`component`, `reason`, `timeout_ms`, `seq`). Install any
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see the output.
//!
//! ## Levels
//! - `info`: component start/stop progress, shutdown requests, completion
//! - `warn`: component failures, stop timeouts, grace exceeded, subscriber problems
//! - `debug`: signal bridge armed

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Structured logging subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        let seq = e.seq;

        match e.kind {
            EventKind::ComponentStarting => {
                tracing::info!(seq, component, "starting component");
            }
            EventKind::ComponentExited => {
                tracing::info!(seq, component, "component exited");
            }
            EventKind::ComponentFailed => {
                tracing::warn!(seq, component, reason, "component failed");
            }
            EventKind::ComponentStopping => {
                tracing::info!(seq, component, timeout_ms = e.timeout_ms, "stopping component");
            }
            EventKind::ComponentStopped => {
                tracing::info!(seq, component, "component stopped");
            }
            EventKind::StopTimedOut => {
                tracing::warn!(seq, component, timeout_ms = e.timeout_ms, "stop timed out");
            }
            EventKind::SignalsArmed => {
                tracing::debug!(seq, signals = reason, "signal listeners armed");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(seq, reason, "shutdown requested");
            }
            EventKind::AllStopped => {
                tracing::info!(seq, "all components stopped");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(seq, stuck = reason, timeout_ms = e.timeout_ms, "shutdown grace exceeded");
            }
            EventKind::RunFinished => {
                tracing::info!(seq, reason, "run finished");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                tracing::warn!(seq, subscriber = component, reason, kind = ?e.kind, "subscriber problem");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
