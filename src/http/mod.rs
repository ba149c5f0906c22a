//! # HTTP listener component (feature `http`).
//!
//! - [`HttpServer`] - an `axum` server managed as a [`Component`](crate::Component)
//! - [`Response`] - JSON response envelope `{status_code, code, message, data}`
//!
//! With the `tls` feature the server can terminate TLS: pass a [`RustlsConfig`]
//! (for example from [`load_tls`]) to [`HttpServer::with_tls`].

mod response;
mod server;

pub use response::Response;
pub use server::HttpServer;

#[cfg(feature = "tls")]
pub use axum_server::tls_rustls::RustlsConfig;
#[cfg(feature = "tls")]
pub use server::load_tls;
