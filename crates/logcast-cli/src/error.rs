//! CLI-specific error types and mappings.
//!
//! Maps runner and channel errors to exit codes and user-facing messages.

use logcast_core::ChannelError;
use logcast_runtime::RunnerError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument error (bad URL, unknown script).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error (unreadable scripts directory).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not reach or talk to the server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The script could not be started or supervised.
    #[error("Process error: {0}")]
    Process(String),

    /// The script ran and exited non-zero.
    #[error("Script {script} failed with exit code {code:?}")]
    ScriptFailed { script: String, code: Option<i32> },

    /// Server error.
    #[error("Server error: {0}")]
    Server(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    ///
    /// A failed script passes its own exit code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::Io(_) => 74,        // EX_IOERR
            Self::Config(_) => 78,    // EX_CONFIG
            Self::Connection(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71,   // EX_OSERR
            Self::ScriptFailed { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            Self::Server(_) => 1,
        }
    }
}

impl From<RunnerError> for CliError {
    fn from(err: RunnerError) -> Self {
        let message = err.to_string();
        match err {
            RunnerError::NotFound(_) => Self::Arguments(message),
            RunnerError::Catalog { .. } => Self::Config(message),
            RunnerError::AlreadyRunning(_)
            | RunnerError::NotRunning(_)
            | RunnerError::Spawn { .. }
            | RunnerError::Internal(_) => Self::Process(message),
        }
    }
}

impl From<ChannelError> for CliError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::InvalidEndpoint { .. } => Self::Arguments(err.to_string()),
            _ => Self::Connection(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
        assert_eq!(CliError::Connection("x".into()).exit_code(), 69);
    }

    #[test]
    fn test_failed_script_passes_code_through() {
        let err = CliError::ScriptFailed {
            script: "main".into(),
            code: Some(3),
        };
        assert_eq!(err.exit_code(), 3);

        let killed = CliError::ScriptFailed {
            script: "main".into(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);
    }

    #[test]
    fn test_runner_error_mapping() {
        let err: CliError = RunnerError::NotFound("ghost".into()).into();
        assert!(matches!(err, CliError::Arguments(_)));

        let err: CliError = ChannelError::invalid_endpoint("ftp://x", "unsupported").into();
        assert_eq!(err.exit_code(), 2);
    }
}
