//! Typed payloads for the named events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Envelope, SCRIPT_STATUS};
use crate::error::ChannelError;

/// Payload of a `log_update` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogUpdate {
    /// Text appended to the display as-is.
    pub data: String,
}

impl LogUpdate {
    /// Decode from a raw event payload.
    ///
    /// A payload that is not an object, or whose `data` field is missing or
    /// not a string, is rejected rather than appended.
    pub fn from_payload(payload: &Value) -> Result<Self, ChannelError> {
        Self::deserialize(payload).map_err(|e| ChannelError::Decode(e.to_string()))
    }
}

/// Lifecycle state of a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptState {
    /// Process spawned.
    Started,
    /// Process exited with status 0.
    Succeeded,
    /// Process exited non-zero, was killed, or could not be spawned.
    Failed,
    /// No script with that name exists.
    Missing,
}

/// Payload of a `script_status` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStatus {
    pub script: String,
    pub state: ScriptState,
    /// Exit code, when the process exited normally.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<i32>,
}

impl ScriptStatus {
    pub fn started(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            state: ScriptState::Started,
            code: None,
        }
    }

    pub fn succeeded(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            state: ScriptState::Succeeded,
            code: Some(0),
        }
    }

    pub fn failed(script: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            script: script.into(),
            state: ScriptState::Failed,
            code,
        }
    }

    pub fn missing(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            state: ScriptState::Missing,
            code: None,
        }
    }

    /// Wrap in a `script_status` envelope.
    pub fn to_envelope(&self) -> Result<Envelope, ChannelError> {
        Envelope::new(SCRIPT_STATUS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_update_from_payload() {
        let update = LogUpdate::from_payload(&json!({ "data": "line\n" })).unwrap();
        assert_eq!(update.data, "line\n");
    }

    #[test]
    fn test_log_update_rejects_missing_data() {
        assert!(LogUpdate::from_payload(&json!({})).is_err());
        assert!(LogUpdate::from_payload(&Value::Null).is_err());
        assert!(LogUpdate::from_payload(&json!({ "data": 42 })).is_err());
    }

    #[test]
    fn test_script_status_serialization() {
        let json = serde_json::to_string(&ScriptStatus::started("main")).unwrap();
        assert_eq!(json, r#"{"script":"main","state":"started"}"#);
    }
}
