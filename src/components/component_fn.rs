//! # Closure-backed component (`ComponentFn`)
//!
//! [`ComponentFn`] wraps two closures, one per operation, each producing a fresh
//! future per call. Shared state between `start` and `stop` goes into an `Arc`
//! captured by both closures.
//!
//! ## Example
//! ```rust
//! use appvisor::{ComponentError, ComponentFn, ComponentRef, Context};
//!
//! let c: ComponentRef = ComponentFn::arc(
//!     "worker",
//!     |ctx: Context| async move {
//!         ctx.done().await;
//!         Ok::<_, ComponentError>(())
//!     },
//!     |_ctx: Context| async { Ok::<_, ComponentError>(()) },
//! );
//!
//! assert_eq!(c.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::components::component::Component;
use crate::context::Context;
use crate::error::ComponentError;

/// Function-backed component.
pub struct ComponentFn<S, T> {
    name: Cow<'static, str>,
    start: S,
    stop: T,
}

impl<S, T> ComponentFn<S, T> {
    /// Creates a new function-backed component.
    ///
    /// Prefer [`ComponentFn::arc`] when you immediately need a [`ComponentRef`](crate::ComponentRef).
    pub fn new(name: impl Into<Cow<'static, str>>, start: S, stop: T) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
        }
    }

    /// Creates the component and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, start: S, stop: T) -> Arc<Self> {
        Arc::new(Self::new(name, start, stop))
    }
}

impl<S, T> std::fmt::Debug for ComponentFn<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFn").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<S, SFut, T, TFut> Component for ComponentFn<S, T>
where
    S: Fn(Context) -> SFut + Send + Sync + 'static,
    SFut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    T: Fn(Context) -> TFut + Send + Sync + 'static,
    TFut: Future<Output = Result<(), ComponentError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: Context) -> Result<(), ComponentError> {
        (self.start)(ctx).await
    }

    async fn stop(&self, ctx: Context) -> Result<(), ComponentError> {
        (self.stop)(ctx).await
    }
}
