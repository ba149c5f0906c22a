//! # Reacting to lifecycle events.
//!
//! Implement [`Subscribe`] to watch a run: log it, count component failures,
//! page someone when a stop times out. Subscribers are passed to
//! [`ApplicationBuilder::with_subscribers`](crate::ApplicationBuilder::with_subscribers).
//!
//! A subscriber runs on its own worker behind a bounded queue, so a slow one never
//! holds up a component's start or stop. When its queue is full the event is dropped
//! for that subscriber and `SubscriberOverflow` is published instead. All workers are
//! drained before [`Application::run`](crate::Application::run) returns, so the last
//! event a subscriber sees is `RunFinished`.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use appvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ComponentFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of the lifecycle events of an application.
///
/// `on_event` runs on the subscriber's worker task, one event at a time.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one lifecycle event.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` and `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Number of events that may wait for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
