//! # Run-state machine.
//!
//! ```text
//! Idle ──run()──► Running ──stop()/signal/failure/completion──► Finished
//!   └────────────────────stop() before run()───────────────────────┘
//! ```
//!
//! ## Rules
//! - Transitions only move forward; `Finished` is terminal.
//! - `Idle → Running` is a single compare-and-swap; the loser learns the observed state.
//! - `* → Finished` is an unconditional swap and is idempotent.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::RunError;

/// Lifecycle state of an [`Application`](crate::Application).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Built, `run` not called yet.
    Idle = 0,
    /// `run` is in progress.
    Running = 1,
    /// Stopped or completed; the application is inert.
    Finished = 2,
}

impl RunState {
    /// Decodes a raw state value.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(RunState::Idle),
            1 => Some(RunState::Running),
            2 => Some(RunState::Finished),
            _ => None,
        }
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Finished => "finished",
        }
    }
}

/// Atomic holder of a [`RunState`].
#[derive(Debug)]
pub(crate) struct StateCell {
    raw: AtomicU8,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            raw: AtomicU8::new(RunState::Idle as u8),
        }
    }

    /// Attempts `Idle → Running`.
    ///
    /// Returns the usage error matching the observed state when the swap fails.
    pub(crate) fn begin(&self) -> Result<(), RunError> {
        match self.raw.compare_exchange(
            RunState::Idle as u8,
            RunState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(observed) => Err(Self::rejection(observed)),
        }
    }

    /// Moves to `Finished` and returns `true` if this call performed the transition.
    pub(crate) fn finish(&self) -> bool {
        self.raw.swap(RunState::Finished as u8, Ordering::AcqRel) != RunState::Finished as u8
    }

    /// Current state; unknown raw values read as `Finished`.
    pub(crate) fn load(&self) -> RunState {
        RunState::from_u8(self.raw.load(Ordering::Acquire)).unwrap_or(RunState::Finished)
    }

    fn rejection(observed: u8) -> RunError {
        match RunState::from_u8(observed) {
            Some(RunState::Running) => RunError::AlreadyRunning,
            Some(RunState::Finished) => RunError::AlreadyFinished,
            _ => RunError::BadState(observed),
        }
    }

    #[cfg(test)]
    fn store_raw(&self, raw: u8) {
        self.raw.store(raw, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_only_succeeds_from_idle() {
        let cell = StateCell::new();
        assert_eq!(cell.load(), RunState::Idle);
        assert!(cell.begin().is_ok());
        assert_eq!(cell.load(), RunState::Running);
        assert!(matches!(cell.begin(), Err(RunError::AlreadyRunning)));
    }

    #[test]
    fn finish_is_idempotent() {
        let cell = StateCell::new();
        cell.begin().unwrap();
        assert!(cell.finish());
        assert!(!cell.finish());
        assert_eq!(cell.load(), RunState::Finished);
        assert!(matches!(cell.begin(), Err(RunError::AlreadyFinished)));
    }

    #[test]
    fn finish_before_begin_blocks_run() {
        let cell = StateCell::new();
        assert!(cell.finish());
        assert!(matches!(cell.begin(), Err(RunError::AlreadyFinished)));
    }

    #[test]
    fn unknown_state_is_reported() {
        let cell = StateCell::new();
        cell.store_raw(9);
        assert!(matches!(cell.begin(), Err(RunError::BadState(9))));
    }

    #[test]
    fn concurrent_begin_has_one_winner() {
        let cell = std::sync::Arc::new(StateCell::new());
        let winners: usize = (0..8)
            .map(|_| {
                let cell = cell.clone();
                std::thread::spawn(move || cell.begin().is_ok())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}
