//! Axum web server for logcast.
//!
//! Serves the live-tail page, the `/socket` event channel and a small JSON
//! API over the shared [`logcast_runtime::LogHub`] and
//! [`logcast_runtime::ScriptRunner`].

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_tungstenite as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{
    AxumContext, CorsConfig, ServerConfig, bootstrap, serve, serve_until, start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
