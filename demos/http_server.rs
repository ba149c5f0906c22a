//! # Example: http_server
//!
//! Serves `GET /hello` until Ctrl-C, then drains connections within the stop timeout.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example http_server --features http
//! curl http://127.0.0.1:9090/hello
//!
//! # HTTPS
//! TLS_CERT=tests/fixtures/cert.pem TLS_KEY=tests/fixtures/key.pem \
//!     cargo run --example http_server --features tls
//! curl --cacert tests/fixtures/ca.pem https://localhost:9090/hello
//! ```

use std::sync::Arc;
use std::time::Duration;

use appvisor::http::{HttpServer, Response};
use appvisor::{Application, ComponentRef, Config, Context, LogWriter, Subscribe};
use axum::routing::get;
use axum::{Extension, Router};
use tracing_subscriber::EnvFilter;

struct Greeting(&'static str);

async fn hello(Extension(ctx): Extension<Context>) -> Response<&'static str> {
    Response::new(1, ctx.value::<Greeting>().map_or("hello", |g| g.0))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let router = Router::new().route("/hello", get(hello));
    #[allow(unused_mut)]
    let mut server = HttpServer::new(([127, 0, 0, 1], 9090).into(), router);
    #[cfg(feature = "tls")]
    if let (Ok(cert), Ok(key)) = (std::env::var("TLS_CERT"), std::env::var("TLS_KEY")) {
        server = server.with_tls(appvisor::http::load_tls(cert, key).await?);
    }
    let server: ComponentRef = Arc::new(server);

    let cfg = Config {
        stop_timeout: Duration::from_secs(5),
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let app = Application::builder(cfg)
        .with_value(Greeting("hello"))
        .with_subscribers(subs)
        .with_component(server)
        .build()?;

    app.run().await?;
    Ok(())
}
