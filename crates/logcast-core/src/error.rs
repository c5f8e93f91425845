//! Channel-level error types.
//!
//! Adapters map these to their own error types (HTTP status codes,
//! CLI exit codes).

use thiserror::Error;

/// Errors raised while establishing or decoding the event channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The endpoint could not be parsed or uses an unsupported scheme.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A frame or payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A payload could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Connecting to the endpoint failed.
    #[error("Connect failed: {0}")]
    Connect(String),

    /// The channel was closed and will not reconnect.
    #[error("Channel closed")]
    Closed,
}

impl ChannelError {
    /// Build an `InvalidEndpoint` error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
