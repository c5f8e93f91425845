//! Log lines captured from running scripts.

use serde::{Deserialize, Serialize};

use crate::events::Envelope;

/// Where a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Stdout,
    Stderr,
    /// Messages produced by logcast itself (start/finish banners).
    System,
}

impl LogSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::System => "system",
        }
    }
}

/// A single captured line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub source: LogSource,
    /// Line content without its trailing newline
    pub line: String,
}

impl LogLine {
    /// Create a new log line stamped with the current time.
    pub fn new(source: LogSource, line: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            source,
            line: line.into(),
        }
    }

    /// Text appended to the display for this line.
    pub fn payload(&self) -> String {
        format!("{}\n", self.line)
    }

    /// Wrap as a `log_update` event.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::log_update(self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_restores_newline() {
        let line = LogLine::new(LogSource::Stdout, "fetching tickers");
        assert_eq!(line.payload(), "fetching tickers\n");
        assert_eq!(line.to_envelope().data["data"], "fetching tickers\n");
    }

    #[test]
    fn test_serialization_uses_lowercase_source() {
        let line = LogLine::new(LogSource::Stderr, "boom");
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"source\":\"stderr\""));
        assert!(json.contains("\"line\":\"boom\""));
    }
}
