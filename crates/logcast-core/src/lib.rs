//! Core domain types for logcast.
//!
//! This crate holds everything that is independent of a particular transport:
//!
//! - `events` - wire envelope, payload types and the name → handler router
//! - `buffer` - the append-only display buffer and its scroll model
//! - `view` - the log sink view that turns `log_update` events into text
//! - `log_line` - log lines as captured from running scripts
//! - `status` - the connected/disconnected signal
//!
//! Adapters (the WebSocket client, the axum server, the CLI) depend on this
//! crate; it never depends on them.

#![deny(unused_crate_dependencies)]

pub mod buffer;
pub mod error;
pub mod events;
pub mod log_line;
pub mod status;
pub mod view;

// Re-export commonly used types for convenience
pub use buffer::{DisplayBuffer, Retention};
pub use error::ChannelError;
pub use events::{
    CONNECT, Envelope, EventRouter, EventSource, Handler, LOG_UPDATE, LogUpdate, SCRIPT_STATUS,
    ScriptState, ScriptStatus, Subscription,
};
pub use log_line::{LogLine, LogSource};
pub use status::ConnectionStatus;
pub use view::{LogSinkView, Renderer, ViewState};
