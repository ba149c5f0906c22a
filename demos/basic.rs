//! # Example: basic
//!
//! Runs two components until Ctrl-C (or SIGTERM), then stops them gracefully.
//!
//! Shows how to:
//! - Implement the [`Component`] trait and build one from closures with [`ComponentFn`].
//! - Pass a caller value to every `start` / `stop` through the context.
//! - Attach the built-in [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! Application::run()
//!     ├─► greeter.start()   prints the caller value and returns
//!     ├─► ticker.start()    ticks until the root context is cancelled
//!     │
//!     ├─◄ SIGINT / SIGTERM ─► ShutdownRequested
//!     │
//!     ├─► greeter.stop()    (detached context, 3s deadline)
//!     └─► ticker.stop()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use appvisor::{
    Application, Component, ComponentError, ComponentFn, ComponentRef, Config, Context,
    LogWriter, Subscribe,
};
use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

/// Value supplied by `main` and visible to every component.
struct Origin(&'static str);

/// Component that only reports its lifecycle.
struct Greeter {
    id: &'static str,
}

#[async_trait]
impl Component for Greeter {
    fn name(&self) -> &str {
        self.id
    }

    async fn start(&self, ctx: Context) -> Result<(), ComponentError> {
        let origin = ctx.value::<Origin>().map_or("-", |o| o.0);
        println!("{} start: {origin}", self.id);
        Ok(())
    }

    async fn stop(&self, ctx: Context) -> Result<(), ComponentError> {
        let origin = ctx.value::<Origin>().map_or("-", |o| o.0);
        println!("{} stop: {origin} (remaining {:?})", self.id, ctx.remaining());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config {
        stop_timeout: Duration::from_secs(3),
        ..Config::default()
    };

    let ticks = Arc::new(AtomicU64::new(0));
    let (t1, t2) = (ticks.clone(), ticks.clone());
    let ticker: ComponentRef = ComponentFn::arc(
        "ticker",
        move |ctx: Context| {
            let ticks = t1.clone();
            async move {
                let mut interval = tokio::time::interval(Duration::from_millis(500));
                while ctx.run_until_done(interval.tick()).await.is_ok() {
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
                Ok::<_, ComponentError>(())
            }
        },
        move |_ctx: Context| {
            let ticks = t2.clone();
            async move {
                println!("ticker stop: {} ticks", ticks.load(Ordering::Relaxed));
                Ok::<_, ComponentError>(())
            }
        },
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let app = Application::builder(cfg)
        .with_value(Origin("message from main"))
        .with_subscribers(subs)
        .with_components([
            Arc::new(Greeter { id: "service-a" }) as ComponentRef,
            Arc::new(Greeter { id: "service-b" }) as ComponentRef,
            ticker,
        ])
        .build()?;

    println!("running, press Ctrl-C to stop");
    app.run().await?;
    println!("done, state = {:?}", app.state());
    Ok(())
}
