//! # Runtime events emitted by an application run.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Component events**: start/stop progress of one component
//! - **Shutdown events**: triggers and the outcome of the shutdown drain
//! - **Subscriber events**: delivery problems of the fan-out workers
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use appvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StopTimedOut)
//!     .with_component("db")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::StopTimedOut);
//! assert_eq!(ev.component.as_deref(), Some("db"));
//! assert_eq!(ev.timeout_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Kind of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Component events ===
    /// The start task of a component is about to call `start`.
    ///
    /// Sets: `component`
    ComponentStarting,

    /// `start` returned `Ok` (or the cancellation sentinel).
    ///
    /// Sets: `component`
    ComponentExited,

    /// `start` or `stop` returned an error.
    ///
    /// Sets: `component`, `reason` (`start: <error>` / `stop: <error>`)
    ComponentFailed,

    /// Shutdown reached the component; `stop` is about to be called.
    ///
    /// Sets: `component`, `timeout_ms`
    ComponentStopping,

    /// `stop` returned `Ok`.
    ///
    /// Sets: `component`
    ComponentStopped,

    /// `stop` did not return within the stop timeout and was abandoned.
    ///
    /// Sets: `component`, `timeout_ms`
    StopTimedOut,

    // === Shutdown events ===
    /// The signal bridge registered its listeners.
    ///
    /// Sets: `reason` (comma-separated signal names)
    SignalsArmed,

    /// Shutdown was triggered (first trigger only).
    ///
    /// Sets: `reason` (`stop requested`, `signal SIGTERM`, `component failed: <error>`, `context done`)
    ShutdownRequested,

    /// Every task finished.
    AllStopped,

    /// The grace period elapsed and the remaining tasks were aborted.
    ///
    /// Sets: `timeout_ms`, `reason` (stuck task labels)
    GraceExceeded,

    /// `run` is about to return. Always the last event of a run.
    ///
    /// Sets: `reason` (the returned error, if the run failed)
    RunFinished,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `component` (subscriber name), `reason`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `component` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Component (or subscriber) name, if applicable.
    pub component: Option<Arc<str>>,
    /// Human-readable reason (errors, signal names, ...).
    pub reason: Option<Arc<str>>,
    /// Timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_component(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_component(subscriber)
            .with_reason(info)
    }

    /// Returns true for events the subscriber set reports about itself.
    ///
    /// An overflow of such an event is not re-published, so a stuck subscriber
    /// cannot feed the bus with its own overflow reports.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
