//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Application` (shutdown, completion), the per-component start
//!   and stop tasks, the signal bridge, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the per-run event listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from [`Application::subscribe`](crate::Application::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
