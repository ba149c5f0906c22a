//! # Bodies of the tasks spawned by one run.
//!
//! Per component:
//! - [`start_component`]: releases the dispatch latch and the start barrier, calls `start`;
//! - [`stop_component`]: waits for the latch and for the root context, calls `stop`
//!   with a detached, deadlined context.
//!
//! Once per run:
//! - [`bridge_signals`]: registers the OS signals and turns the first delivery into a stop.
//!
//! ## Event flow
//! ```text
//! start task:  ComponentStarting → start() → ComponentExited | ComponentFailed
//! stop task:   ComponentStopping → stop()  → ComponentStopped | ComponentFailed
//!                                          └─ (timeout) StopTimedOut → ComponentFailed
//! bridge:      SignalsArmed → (signal) ShutdownRequested
//! ```
//!
//! ## Rules
//! - Every task resolves to `Ok(())` or the `RunError` it contributes to the run.
//! - `ComponentError::Canceled` is a clean exit, never an error.
//! - A stop whose start was never dispatched is skipped.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time;

use crate::components::ComponentRef;
use crate::context::Context;
use crate::core::handle::StopHandle;
use crate::core::signals::{Signal, SignalListener};
use crate::error::{ComponentError, Phase, RunError};
use crate::events::{Bus, Event, EventKind};

/// Proof that a start attempt was dispatched.
///
/// Consumed by the start task before it calls `start`: fires the component's own
/// latch (unblocking its stop task) and drops its share of the start barrier.
pub(crate) struct Dispatch {
    latch: oneshot::Sender<()>,
    barrier: mpsc::Sender<()>,
}

impl Dispatch {
    pub(crate) fn new(latch: oneshot::Sender<()>, barrier: mpsc::Sender<()>) -> Self {
        Self { latch, barrier }
    }

    fn release(self) {
        let _ = self.latch.send(());
        drop(self.barrier);
    }
}

/// Start task of one component.
pub(crate) async fn start_component(
    component: ComponentRef,
    ctx: Context,
    dispatch: Dispatch,
    bus: Bus,
) -> Result<(), RunError> {
    dispatch.release();

    let name = component.name().to_string();
    bus.publish(Event::new(EventKind::ComponentStarting).with_component(name.as_str()));

    match component.start(ctx).await {
        Ok(()) => {
            bus.publish(Event::new(EventKind::ComponentExited).with_component(name.as_str()));
            Ok(())
        }
        Err(e) if e.is_cancellation() => {
            bus.publish(Event::new(EventKind::ComponentExited).with_component(name.as_str()));
            Ok(())
        }
        Err(e) => Err(failed(&bus, name, Phase::Start, e)),
    }
}

/// Stop task of one component.
pub(crate) async fn stop_component(
    component: ComponentRef,
    root: Context,
    latch: oneshot::Receiver<()>,
    timeout: Duration,
    bus: Bus,
) -> Result<(), RunError> {
    if latch.await.is_err() {
        return Ok(());
    }
    root.done().await;

    let name = component.name().to_string();
    bus.publish(
        Event::new(EventKind::ComponentStopping)
            .with_component(name.as_str())
            .with_timeout(timeout),
    );

    let ctx = root.without_cancel().with_timeout(timeout);
    let res = match time::timeout(timeout, component.stop(ctx)).await {
        Ok(r) => r,
        Err(_elapsed) => {
            bus.publish(
                Event::new(EventKind::StopTimedOut)
                    .with_component(name.as_str())
                    .with_timeout(timeout),
            );
            Err(ComponentError::DeadlineExceeded)
        }
    };

    match res {
        Ok(()) => {
            bus.publish(Event::new(EventKind::ComponentStopped).with_component(name.as_str()));
            Ok(())
        }
        Err(e) if e.is_cancellation() => {
            bus.publish(Event::new(EventKind::ComponentStopped).with_component(name.as_str()));
            Ok(())
        }
        Err(e) => Err(failed(&bus, name, Phase::Stop, e)),
    }
}

/// Signal bridge: stops the application on the first configured signal.
///
/// Exits cleanly once the root context is done.
pub(crate) async fn bridge_signals(
    signals: Vec<Signal>,
    root: Context,
    handle: StopHandle,
    bus: Bus,
) -> Result<(), RunError> {
    if root.is_done() {
        return Ok(());
    }
    let mut listener = SignalListener::register(&signals).map_err(RunError::Signal)?;
    let armed: Vec<&str> = listener.armed().iter().map(Signal::as_str).collect();
    if !armed.is_empty() {
        bus.publish(Event::new(EventKind::SignalsArmed).with_reason(armed.join(",")));
    }

    tokio::select! {
        _ = root.done() => {}
        delivered = listener.recv() => match delivered {
            Some(sig) => handle.trigger(&format!("signal {sig}")),
            None => root.done().await,
        },
    }
    Ok(())
}

/// Publishes `ComponentFailed` and wraps the error.
fn failed(bus: &Bus, name: String, phase: Phase, source: ComponentError) -> RunError {
    bus.publish(
        Event::new(EventKind::ComponentFailed)
            .with_component(name.as_str())
            .with_reason(format!("{phase}: {source}")),
    );
    RunError::Component {
        component: name,
        phase,
        source,
    }
}
