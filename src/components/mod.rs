//! # Component abstractions.
//!
//! - [`Component`] - trait for start/stop-capable units managed by an application
//! - [`ComponentFn`] - closure-backed implementation
//! - [`ComponentRef`] - shared reference to a component (`Arc<dyn Component>`)

mod component;
mod component_fn;

pub use component::{Component, ComponentRef};
pub use component_fn::ComponentFn;
