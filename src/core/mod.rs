//! Runtime core: lifecycle and orchestration.
//!
//! The public API from this module is [`Application`] (with its builder, [`Config`]
//! and [`StopHandle`]), [`RunState`] and [`Signal`].
//!
//! Internal modules:
//! - [`runner`]: bodies of the start, stop and signal tasks with event publishing;
//! - [`application`]: spawns the tasks, records the first error, drains on shutdown;
//! - [`state`]: the atomic `Idle → Running → Finished` cell;
//! - [`handle`]: the idempotent shutdown trigger;
//! - [`signals`]: cross-platform OS signal registration.

mod application;
mod builder;
mod config;
mod handle;
mod runner;
mod signals;
mod state;

pub use application::Application;
pub use builder::ApplicationBuilder;
pub use config::Config;
pub use handle::StopHandle;
pub use signals::Signal;
pub use state::RunState;
