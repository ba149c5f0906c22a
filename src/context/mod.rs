//! # Execution context passed to every component operation.
//!
//! A [`Context`] bundles three things:
//! - a [`CancellationToken`] (cancelled by the application when shutdown begins),
//! - an optional deadline (set on the contexts handed to `stop`),
//! - a [`Values`] map with caller-supplied data.
//!
//! ```text
//! outer (caller) ──child()──► root (owned by Application) ──► start(ctx)
//!                                   │
//!                                   └─without_cancel().with_timeout(stop_timeout)──► stop(ctx)
//! ```
//!
//! A context is **done** once its token is cancelled or its deadline has passed.
//! Deadlines are evaluated lazily against [`tokio::time::Instant`]; no timer task is spawned.

mod values;

pub use values::Values;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

/// Cancellation token, deadline and values for one component operation.
///
/// Cloning is cheap; clones share the token and the value map.
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use appvisor::Context;
///
/// struct Origin(&'static str);
///
/// let root = Context::background().with_value(Origin("main"));
/// let stop = root.without_cancel().with_timeout(Duration::from_secs(5));
///
/// assert_eq!(stop.value::<Origin>().map(|o| o.0), Some("main"));
/// assert!(stop.deadline().is_some());
/// assert!(!stop.is_done());
/// ```
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    values: Values,
}

impl Context {
    /// Creates a context that is never cancelled, has no deadline and carries no values.
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Creates a context driven by an externally owned token.
    ///
    /// Cancelling `token` makes this context (and everything derived from it) done.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            values: Values::new(),
        }
    }

    /// Returns a context carrying `value` in addition to the current values.
    pub fn with_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values = self.values.with(value);
        self
    }

    /// Returns a context carrying `values` instead of the current ones.
    pub fn with_values(mut self, values: Values) -> Self {
        self.values = values;
        self
    }

    /// Looks up a caller-supplied value by type.
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// All caller-supplied values.
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Derives a context that is cancelled together with this one but can also be cancelled on its own.
    ///
    /// Deadline and values are inherited.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            values: self.values.clone(),
        }
    }

    /// Derives a context that keeps the values but drops cancellation and deadline.
    pub fn without_cancel(&self) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            values: self.values.clone(),
        }
    }

    /// Returns a context whose deadline is `timeout` from now (or the current deadline, if earlier).
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns a context with the given deadline (or the current deadline, if earlier).
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline (`None` if there is no deadline).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns true once the token is cancelled (deadline expiry is not cancellation).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns true once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context is done, or `None` while it is still live.
    ///
    /// Cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<ComponentError> {
        if self.token.is_cancelled() {
            return Some(ComponentError::Canceled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(ComponentError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes when the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Drives `fut` until it completes or the context is done.
    ///
    /// Returns the reason ([`ComponentError::Canceled`] or
    /// [`ComponentError::DeadlineExceeded`]) if the context finished first.
    pub async fn run_until_done<F: Future>(&self, fut: F) -> Result<F::Output, ComponentError> {
        tokio::select! {
            biased;
            _ = self.done() => Err(self.err().unwrap_or(ComponentError::Canceled)),
            out = fut => Ok(out),
        }
    }

    /// Cancels the underlying token.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn child_follows_parent_cancellation() {
        let parent = Context::background();
        let child = parent.child();
        assert!(!child.is_done());

        parent.cancel();
        child.done().await;
        assert!(matches!(child.err(), Some(ComponentError::Canceled)));
    }

    #[tokio::test(start_paused = true)]
    async fn child_cancel_does_not_touch_parent() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn without_cancel_detaches_from_cancelled_parent() {
        let root = Context::background().with_value(7u32);
        root.cancel();

        let stop = root.without_cancel().with_timeout(Duration::from_secs(10));
        assert!(!stop.is_done());
        assert!(!stop.is_cancelled());
        assert_eq!(stop.value::<u32>(), Some(&7));
        assert_eq!(stop.remaining(), Some(Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        ctx.done().await;
        assert!(matches!(ctx.err(), Some(ComponentError::DeadlineExceeded)));
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn with_deadline_keeps_the_earliest() {
        let ctx = Context::background().with_timeout(Duration::from_secs(1));
        let first = ctx.deadline();
        let ctx = ctx.with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.deadline(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn run_until_done_reports_reason() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let res = ctx
            .run_until_done(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(matches!(res, Err(ComponentError::DeadlineExceeded)));

        let ctx = Context::background();
        assert_eq!(ctx.run_until_done(async { 3 }).await.unwrap(), 3);
    }
}
