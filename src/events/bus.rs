//! # Lifecycle event bus.
//!
//! Start tasks, stop tasks, the signal bridge and the stop handle publish every
//! lifecycle transition of a run to one [`Bus`]. The application forwards it to its
//! subscribers; callers can read it directly through
//! [`Application::subscribe`](crate::Application::subscribe).
//!
//! Publishing never waits on a component or a subscriber. The bus keeps the last
//! `Config::bus_capacity` events: a receiver that falls behind gets
//! `RecvError::Lagged(n)` and resumes after the `n` events it missed. Events
//! published while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Sending side of the lifecycle event stream, shared by every task of a run.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes `ev` to the current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Receiver of the events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
