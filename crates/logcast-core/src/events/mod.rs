//! Named events carried over the channel.
//!
//! # Wire Format
//!
//! Every WebSocket text frame carries exactly one envelope:
//!
//! ```json
//! { "event": "log_update", "data": { "data": "build started\n" } }
//! ```
//!
//! `connect` is never sent over the wire. The client fires it locally on
//! every successful (re)connection, with a `null` payload.

mod payloads;
mod router;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChannelError;

pub use payloads::{LogUpdate, ScriptState, ScriptStatus};
pub use router::{EventRouter, EventSource, Handler, Subscription};

/// Lifecycle event fired by the client after each successful connection.
pub const CONNECT: &str = "connect";

/// A chunk of log text to append to the display.
pub const LOG_UPDATE: &str = "log_update";

/// Script lifecycle change (started, succeeded, failed, missing).
pub const SCRIPT_STATUS: &str = "script_status";

/// A named event with its JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name used for handler lookup.
    pub event: String,
    /// Opaque payload handed to every handler registered for `event`.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Build an envelope from any serializable payload.
    pub fn new(event: impl Into<String>, data: &impl Serialize) -> Result<Self, ChannelError> {
        let data = serde_json::to_value(data).map_err(|e| ChannelError::Encode(e.to_string()))?;
        Ok(Self {
            event: event.into(),
            data,
        })
    }

    /// Build a `log_update` envelope carrying `data` verbatim.
    pub fn log_update(data: impl Into<String>) -> Self {
        Self {
            event: LOG_UPDATE.to_string(),
            data: serde_json::json!({ "data": data.into() }),
        }
    }

    /// Serialize to the text frame representation.
    pub fn to_json(&self) -> Result<String, ChannelError> {
        serde_json::to_string(self).map_err(|e| ChannelError::Encode(e.to_string()))
    }

    /// Parse a text frame.
    pub fn from_json(text: &str) -> Result<Self, ChannelError> {
        serde_json::from_str(text).map_err(|e| ChannelError::Decode(e.to_string()))
    }

    /// Decode the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ChannelError> {
        serde_json::from_value(self.data.clone()).map_err(|e| ChannelError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_update_wire_format() {
        let json = Envelope::log_update("build started\n").to_json().unwrap();
        assert_eq!(
            json,
            r#"{"event":"log_update","data":{"data":"build started\n"}}"#
        );
    }

    #[test]
    fn test_envelope_without_data_defaults_to_null() {
        let env = Envelope::from_json(r#"{"event":"ping"}"#).unwrap();
        assert_eq!(env.event, "ping");
        assert!(env.data.is_null());
    }

    #[test]
    fn test_garbage_frame_is_decode_error() {
        let err = Envelope::from_json("not json").unwrap_err();
        assert!(matches!(err, ChannelError::Decode(_)));
    }

    #[test]
    fn test_decode_script_status() {
        let status = ScriptStatus::failed("main", Some(2));
        let env = status.to_envelope().unwrap();
        assert_eq!(env.event, SCRIPT_STATUS);
        let back: ScriptStatus = env.decode().unwrap();
        assert_eq!(back, status);
    }
}
