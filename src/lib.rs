//! # appvisor
//!
//! **Appvisor** runs the long-lived components of a process (servers, consumers,
//! background loops) as one unit: it starts them together, waits for a shutdown
//! trigger and stops every one of them within a bounded deadline.
//!
//! A shutdown is triggered by whichever comes first:
//! - an explicit [`Application::stop`] (or [`StopHandle::stop`]),
//! - a configured OS signal (`SIGTERM`, `SIGQUIT`, `SIGINT` by default),
//! - the first failing component,
//! - cancellation of the outer [`Context`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Component   │   │  Component   │   │  Component   │
//!     │ (http, ...)  │   │ (consumer)   │   │ (ticker)     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Application                                                      │
//! │  - StateCell  (Idle → Running → Finished)                         │
//! │  - root Context (cancelled on shutdown)                           │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   start task         start task         start task     signal bridge
//!   stop task          stop task          stop task
//!        │                  │                  │               │
//!        │ Publishes        │                  │               │ Publishes
//!        │ - ComponentStarting / Exited / Failed               │ - SignalsArmed
//!        │ - ComponentStopping / Stopped / StopTimedOut        │ - ShutdownRequested
//!        ▼                  ▼                  ▼               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: Config::bus_capacity)                 │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │     event listener     │
//!                       │     (one per run)      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1  worker2  workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! run():
//!   Idle ──begin()──► Running
//!     ├─ spawn stop task + start task per component (one failure group)
//!     ├─ wait until every start was dispatched (start barrier)
//!     ├─ arm signal bridge
//!     ├─ shutdown trigger ──► Finished, root context cancelled
//!     │     └─ every stop task: stop(ctx without cancellation, deadline = stop_timeout)
//!     └─ all tasks returned ──► first error (or Ok)
//!
//! stop():   any state ──► Finished (idempotent)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                         |
//! |-------------------|-----------------------------------------------------------------|--------------------------------------------|
//! | **Lifecycle**     | Start, wait for a trigger, stop within a deadline.              | [`Application`], [`StopHandle`]            |
//! | **Components**    | Units managed by the application, as traits or closures.        | [`Component`], [`ComponentFn`]             |
//! | **Context**       | Cancellation, deadlines and caller values for every operation.  | [`Context`], [`Values`]                    |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).          | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors for components and runs.                           | [`ComponentError`], [`RunError`]           |
//! | **Configuration** | Stop timeout, signals, grace period, bus capacity.              | [`Config`]                                 |
//!
//! ## Optional features
//! - `http`: exposes [`http::HttpServer`], an `axum` server component, and the
//!   [`http::Response`] JSON envelope. On stop, open connections get until the
//!   stop deadline to finish and are then closed.
//! - `tls`: implies `http`; [`http::HttpServer::with_tls`] serves HTTPS through rustls.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use appvisor::{Application, ComponentError, ComponentFn, ComponentRef, Config, Context, LogWriter, Subscribe};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.stop_timeout = Duration::from_secs(5);
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
//!
//!     let ticker: ComponentRef = ComponentFn::arc(
//!         "ticker",
//!         |ctx: Context| async move {
//!             while !ctx.is_done() {
//!                 tokio::time::sleep(Duration::from_millis(250)).await;
//!             }
//!             Ok::<_, ComponentError>(())
//!         },
//!         |_ctx: Context| async { Ok::<_, ComponentError>(()) },
//!     );
//!
//!     let app = Application::builder(cfg)
//!         .with_subscribers(subs)
//!         .with_component(ticker)
//!         .build()?;
//!
//!     // Blocks until SIGTERM/SIGQUIT/SIGINT or a component failure.
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
mod components;
mod context;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use components::{Component, ComponentFn, ComponentRef};
pub use context::{Context, Values};
pub use core::{Application, ApplicationBuilder, Config, RunState, Signal, StopHandle};
pub use error::{BoxError, ComponentError, ConfigError, Phase, RunError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};

// Optional: an HTTP listener component.
// Enable with: `--features http`
#[cfg(feature = "http")]
pub mod http;
