//! # Start/stop contract for managed components.
//!
//! The [`Application`](crate::Application) calls [`Component::start`] once and
//! [`Component::stop`] once per run. Both receive a [`Context`]:
//! - `start` gets a child of the root context; it is cancelled when shutdown begins.
//! - `stop` gets a context that is **not** cancelled but carries a deadline
//!   (`Config::stop_timeout`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::ComponentError;

/// Shared handle to a component.
pub type ComponentRef = Arc<dyn Component>;

/// # Start/stop-capable unit.
///
/// `start` should either run until its context is done or return promptly with an
/// error. Returning [`ComponentError::Canceled`] after the context was cancelled is
/// a clean exit. `stop` should return once its work is done or its deadline expires.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use appvisor::{Component, ComponentError, Context};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Component for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     async fn start(&self, ctx: Context) -> Result<(), ComponentError> {
///         ctx.done().await;
///         Ok(())
///     }
///
///     async fn stop(&self, _ctx: Context) -> Result<(), ComponentError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Human-readable name used in events and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Brings the component up; may run for the whole lifetime of the application.
    async fn start(&self, ctx: Context) -> Result<(), ComponentError>;

    /// Shuts the component down within the deadline carried by `ctx`.
    async fn stop(&self, ctx: Context) -> Result<(), ComponentError>;
}
