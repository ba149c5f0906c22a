//! Error types used by the appvisor runtime and by components.
//!
//! This module defines three enums:
//!
//! - [`ComponentError`] - errors returned by a component's `start` / `stop`.
//! - [`RunError`] - errors returned by [`Application::run`](crate::Application::run).
//! - [`ConfigError`] - errors raised while building an application.
//!
//! Every enum provides `as_label` (stable snake_case label for logs/metrics).

use std::time::Duration;

use thiserror::Error;

/// Boxed error accepted from arbitrary component code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors produced by component code.
///
/// The runtime never inspects these beyond [`ComponentError::is_cancellation`];
/// anything else is carried through to the caller untouched.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ComponentError {
    /// The component observed the cancellation of its context.
    ///
    /// Never reported as a failure by [`Application::run`](crate::Application::run).
    #[error("context canceled")]
    Canceled,

    /// The deadline of the supplied context expired before the operation finished.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Plain failure with a message.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// I/O failure (binding listeners, serving, ...).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other error produced by component code.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Fail`].
    ///
    /// # Example
    /// ```
    /// use appvisor::ComponentError;
    ///
    /// let err = ComponentError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ComponentError::Fail {
            error: error.into(),
        }
    }

    /// Wraps an arbitrary error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        ComponentError::Other(err.into())
    }

    /// Returns `true` for the cancellation sentinel.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ComponentError::Canceled)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Canceled => "component_canceled",
            ComponentError::DeadlineExceeded => "component_deadline_exceeded",
            ComponentError::Fail { .. } => "component_failed",
            ComponentError::Io(_) => "component_io",
            ComponentError::Other(_) => "component_other",
        }
    }
}

/// Phase of the component lifecycle an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Raised by [`Component::start`](crate::Component::start).
    Start,
    /// Raised by [`Component::stop`](crate::Component::stop).
    Stop,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Start => f.write_str("start"),
            Phase::Stop => f.write_str("stop"),
        }
    }
}

/// # Errors returned by [`Application::run`](crate::Application::run).
///
/// Usage errors (`AlreadyRunning`, `AlreadyFinished`, `BadState`) are returned
/// before any task is spawned. Everything else is the first failure observed
/// while the application was running.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// `run` was called while another `run` is in progress.
    #[error("application is running")]
    AlreadyRunning,

    /// `run` was called after the application finished (or was stopped).
    #[error("application finished")]
    AlreadyFinished,

    /// The run state holds a value outside of the known states.
    #[error("bad application state {0}")]
    BadState(u8),

    /// A component returned an error from `start` or `stop`.
    #[error("{component}: {phase}: {source}")]
    Component {
        /// Name of the failing component.
        component: String,
        /// Lifecycle phase the error was raised in.
        phase: Phase,
        /// The error exactly as the component returned it.
        #[source]
        source: ComponentError,
    },

    /// Registering the OS signal listeners failed.
    #[error("signal registration failed: {0}")]
    Signal(#[source] std::io::Error),

    /// A runtime task panicked.
    #[error("task {task} panicked")]
    Panicked {
        /// Label of the panicking task (e.g. `start:http`).
        task: String,
    },

    /// The shutdown grace period elapsed with tasks still running; they were aborted.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Labels of the tasks that did not finish in time.
        stuck: Vec<String>,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use appvisor::RunError;
    ///
    /// assert_eq!(RunError::AlreadyRunning.as_label(), "run_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::AlreadyRunning => "run_already_running",
            RunError::AlreadyFinished => "run_already_finished",
            RunError::BadState(_) => "run_bad_state",
            RunError::Component { .. } => "run_component_failed",
            RunError::Signal(_) => "run_signal_registration",
            RunError::Panicked { .. } => "run_task_panicked",
            RunError::GraceExceeded { .. } => "run_grace_exceeded",
        }
    }

    /// Returns the component error carried by [`RunError::Component`], if any.
    pub fn component_error(&self) -> Option<&ComponentError> {
        match self {
            RunError::Component { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Indicates a misuse of the [`Application`](crate::Application) API rather than a runtime failure.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            RunError::AlreadyRunning | RunError::AlreadyFinished | RunError::BadState(_)
        )
    }
}

/// # Errors raised while building an application.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `stop_timeout` was zero, so every stop would start out expired.
    #[error("stop timeout must be greater than zero")]
    ZeroStopTimeout,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroStopTimeout => "config_zero_stop_timeout",
        }
    }
}
