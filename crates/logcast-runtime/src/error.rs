//! Runner error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the script catalog and runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No script with this name is registered.
    #[error("Script {0} not found")]
    NotFound(String),

    /// The script is already running.
    #[error("Script {0} is already running")]
    AlreadyRunning(String),

    /// The script is not running.
    #[error("Script {0} is not running")]
    NotRunning(String),

    /// The process could not be spawned.
    #[error("Failed to start script {script}: {reason}")]
    Spawn { script: String, reason: String },

    /// The scripts directory could not be read.
    #[error("Cannot read scripts directory {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    /// Internal runner error.
    #[error("Internal error: {0}")]
    Internal(String),
}
