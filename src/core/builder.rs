//! # Builder for [`Application`].
//!
//! Collects the configuration, the outer context, values, components and
//! subscribers. `build` validates the configuration; nothing runs until
//! [`Application::run`].
//!
//! Values added with [`ApplicationBuilder::with_value`] are kept apart from the
//! outer context and merged onto it at build time, so the call order of
//! `with_context` and `with_value` does not matter. A builder value replaces an
//! outer-context value of the same type.

use std::sync::Arc;

use crate::{
    components::ComponentRef,
    context::{Context, Values},
    core::{application::Application, config::Config},
    error::ConfigError,
    subscribers::Subscribe,
};

/// Builder for constructing an [`Application`].
pub struct ApplicationBuilder {
    cfg: Config,
    context: Context,
    values: Values,
    components: Vec<ComponentRef>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ApplicationBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            context: Context::background(),
            values: Values::new(),
            components: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the outer context.
    ///
    /// The application's root context is derived from it: cancelling the outer
    /// context (or reaching its deadline) shuts the application down, and its
    /// values are visible to every component together with those added by
    /// [`with_value`](Self::with_value), before or after this call.
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.context = ctx;
        self
    }

    /// Adds a value to the context handed to every `start` and `stop`.
    pub fn with_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values = self.values.with(value);
        self
    }

    /// Appends one component. Components are started in insertion order.
    pub fn with_component(mut self, component: ComponentRef) -> Self {
        self.components.push(component);
        self
    }

    /// Appends several components.
    pub fn with_components(mut self, components: impl IntoIterator<Item = ComponentRef>) -> Self {
        self.components.extend(components);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (component start/stop, failures,
    /// shutdown) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the application.
    ///
    /// Needs no runtime: tasks are spawned by [`Application::run`].
    pub fn build(self) -> Result<Arc<Application>, ConfigError> {
        self.cfg.validate()?;
        let values = self.context.values().merged(&self.values);
        let outer = self.context.with_values(values);
        Ok(Arc::new(Application::new_internal(
            self.cfg,
            self.components,
            outer,
            self.subscribers,
        )))
    }
}

impl std::fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("cfg", &self.cfg)
            .field("values", &self.values.len())
            .field("components", &self.components.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

