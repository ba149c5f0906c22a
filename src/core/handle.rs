//! # Shutdown trigger shared by the application, the signal bridge and callers.

use std::sync::Arc;

use crate::context::Context;
use crate::core::state::{RunState, StateCell};
use crate::events::{Bus, Event, EventKind};

/// Cloneable handle that stops an [`Application`](crate::Application).
///
/// Stopping is idempotent and never fails: it marks the application `Finished`
/// and cancels the root context. Failures surface later through `run`.
#[derive(Clone, Debug)]
pub struct StopHandle {
    state: Arc<StateCell>,
    root: Context,
    bus: Bus,
}

impl StopHandle {
    pub(crate) fn new(state: Arc<StateCell>, root: Context, bus: Bus) -> Self {
        Self { state, root, bus }
    }

    /// Requests a graceful shutdown.
    pub fn stop(&self) {
        self.trigger("stop requested");
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state.load()
    }

    /// Moves to `Finished`, cancels the root context and publishes
    /// `ShutdownRequested` on the first call only.
    pub(crate) fn trigger(&self, reason: &str) {
        if self.state.finish() {
            self.bus
                .publish(Event::new(EventKind::ShutdownRequested).with_reason(reason));
        }
        self.root.cancel();
    }

    /// Completion path: same transition as [`StopHandle::trigger`] without an event.
    pub(crate) fn complete(&self) {
        self.state.finish();
        self.root.cancel();
    }
}
