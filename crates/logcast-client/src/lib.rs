//! Client side of the logcast event channel.
//!
//! - [`ConnectionHandle`] owns one WebSocket channel, reconnects on drop and
//!   routes inbound events to subscribers
//! - [`LiveTail`] wires a [`logcast_core::LogSinkView`] to a connection
//! - [`ClientConfig`] collects endpoint, reconnect and display settings
//!
//! There is no process-wide connection: whoever hosts the view creates the
//! handle and passes it where it is needed.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use logcast_axum as _;
#[cfg(test)]
use logcast_runtime as _;
#[cfg(test)]
use tempfile as _;

mod config;
mod connection;
pub mod endpoint;
mod reconnect;
mod tail;

pub use config::ClientConfig;
pub use connection::ConnectionHandle;
pub use endpoint::{socket_endpoint, with_replay};
pub use reconnect::ReconnectPolicy;
pub use tail::LiveTail;
