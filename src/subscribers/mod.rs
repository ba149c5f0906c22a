//! # Event subscribers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   start/stop tasks ── publish(Event) ──► Bus ──► run listener ──► SubscriberSet::emit
//!                                                                     │
//!                                                         ┌───────────┼───────────┐
//!                                                         ▼           ▼           ▼
//!                                                     LogWriter    Metrics      Custom
//! ```
//!
//! - [`Subscribe`] - the subscriber contract
//! - [`SubscriberSet`] - per-subscriber queues and workers
//! - [`LogWriter`] - built-in `tracing` subscriber

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
