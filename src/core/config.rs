//! # Application configuration.
//!
//! Provides [`Config`], the centralized settings of an [`Application`](crate::Application).
//!
//! ## Sentinel values
//! - `grace = 0s` → no overall shutdown bound (`run` waits for every task)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::core::signals::Signal;
use crate::error::ConfigError;

/// Settings of one application.
///
/// ## Field semantics
/// - `stop_timeout`: deadline given to every component's `stop`, applied per component
/// - `signals`: OS signals that trigger shutdown (empty = signals are ignored)
/// - `grace`: overall bound on the drain after shutdown begins (`0s` = unbounded)
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use appvisor::{Config, Signal};
///
/// let mut cfg = Config::default();
/// cfg.stop_timeout = Duration::from_secs(3);
/// cfg.signals = vec![Signal::Terminate];
///
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.grace_limit(), None);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time granted to any one component's `stop`.
    ///
    /// The `stop` context carries this deadline; a `stop` that is still running when it
    /// passes is abandoned and reported as `ComponentError::DeadlineExceeded`.
    pub stop_timeout: Duration,

    /// OS signals that trigger a graceful shutdown.
    pub signals: Vec<Signal>,

    /// Overall bound on the shutdown drain.
    ///
    /// Counted from the moment the root context is done. When it elapses, tasks still
    /// running (typically a `start` that ignores cancellation) are aborted and `run`
    /// returns `RunError::GraceExceeded`. `Duration::ZERO` disables the bound.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the shutdown grace as an `Option` (`None` = unbounded).
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stop_timeout == Duration::ZERO {
            return Err(ConfigError::ZeroStopTimeout);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `stop_timeout = 10s`
    /// - `signals = [SIGTERM, SIGQUIT, SIGINT]`
    /// - `grace = 0s` (unbounded)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(10),
            signals: Signal::defaults(),
            grace: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
