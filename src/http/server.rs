//! # HTTP server as a component.
//!
//! ```text
//! start(ctx):  bind addr ─► axum_server (router + Extension(ctx), optional TLS) ─► returns when shut down
//! stop(ctx):   graceful_shutdown(remaining time of ctx) ─► wait for serve to return, bounded by ctx
//!                   └─ deadline passed: open connections are closed, serve returns
//! ```
//!
//! Handlers can extract the run's [`Context`] with `Extension<Context>` to read
//! values supplied to the application. Cancellation of the start context does not
//! stop the server: only `stop` does, so in-flight requests get until the stop
//! deadline to finish. A request still running at the deadline is cut off, so a
//! hung handler never keeps `start` (and therefore `run`) from returning.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::OnceLock;

use async_trait::async_trait;
use axum::{Extension, Router};
use axum_server::Handle;
use tokio::sync::watch;

#[cfg(feature = "tls")]
use axum_server::tls_rustls::RustlsConfig;

use crate::components::Component;
use crate::context::Context;
use crate::error::ComponentError;

/// `axum` server managed by an [`Application`](crate::Application).
pub struct HttpServer {
    name: Cow<'static, str>,
    addr: SocketAddr,
    router: Router,
    handle: Handle,
    served: watch::Sender<bool>,
    local_addr: OnceLock<SocketAddr>,
    #[cfg(feature = "tls")]
    tls: Option<RustlsConfig>,
}

impl HttpServer {
    /// Creates a server that will listen on `addr` (port `0` picks a free port).
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self {
            name: Cow::Borrowed("http"),
            addr,
            router,
            handle: Handle::new(),
            served: watch::Sender::new(false),
            local_addr: OnceLock::new(),
            #[cfg(feature = "tls")]
            tls: None,
        }
    }

    /// Overrides the component name (default `http`).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Serves HTTPS with the given rustls configuration.
    ///
    /// Requires the `tls` feature flag.
    #[cfg(feature = "tls")]
    pub fn with_tls(mut self, config: RustlsConfig) -> Self {
        self.tls = Some(config);
        self
    }

    /// Address actually bound, once `start` has bound the listener.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Returns true if the server terminates TLS.
    pub fn is_tls(&self) -> bool {
        #[cfg(feature = "tls")]
        if self.tls.is_some() {
            return true;
        }
        false
    }

    async fn serve(&self, ctx: Context) -> Result<(), ComponentError> {
        let listener = std::net::TcpListener::bind(self.addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let _ = self.local_addr.set(addr);
        tracing::info!(server = %self.name, address = %addr, tls = self.is_tls(), "HTTP server starting");

        let app = self.router.clone().layer(Extension(ctx)).into_make_service();

        #[cfg(feature = "tls")]
        if let Some(tls) = &self.tls {
            axum_server::from_tcp_rustls(listener, tls.clone())
                .handle(self.handle.clone())
                .serve(app)
                .await?;
            tracing::info!(server = %self.name, "HTTP server stopped");
            return Ok(());
        }

        axum_server::from_tcp(listener)
            .handle(self.handle.clone())
            .serve(app)
            .await?;
        tracing::info!(server = %self.name, "HTTP server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tls = if self.is_tls() { "enabled" } else { "disabled" };
        f.debug_struct("HttpServer")
            .field("name", &self.name)
            .field("addr", &self.addr)
            .field("local_addr", &self.local_addr())
            .field("tls", &tls)
            .finish()
    }
}

#[async_trait]
impl Component for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: Context) -> Result<(), ComponentError> {
        let res = self.serve(ctx).await;
        self.served.send_replace(true);
        res
    }

    /// Returns `DeadlineExceeded` if connections were still open when `ctx` expired;
    /// those connections are closed and `start` returns.
    async fn stop(&self, ctx: Context) -> Result<(), ComponentError> {
        self.handle.graceful_shutdown(ctx.remaining());

        let mut served = self.served.subscribe();
        let drained = async move {
            let _ = served.wait_for(|done| *done).await;
        };
        let res = ctx.run_until_done(drained).await;
        if res.is_err() {
            tracing::warn!(
                server = %self.name,
                open_connections = self.handle.connection_count(),
                "stop deadline passed, closing connections"
            );
            self.handle.shutdown();
        }
        res
    }
}

/// Loads a PEM certificate chain and private key for [`HttpServer::with_tls`].
///
/// Requires the `tls` feature flag.
#[cfg(feature = "tls")]
pub async fn load_tls(
    cert_path: impl AsRef<std::path::Path>,
    key_path: impl AsRef<std::path::Path>,
) -> Result<RustlsConfig, ComponentError> {
    let (cert_path, key_path) = (cert_path.as_ref(), key_path.as_ref());
    for path in [cert_path, key_path] {
        if !path.exists() {
            return Err(ComponentError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("TLS file not found: {}", path.display()),
            )));
        }
    }
    Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?)
}
