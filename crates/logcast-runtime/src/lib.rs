//! Script execution and log fan-out.
//!
//! # Structure
//!
//! - `LogHub` - bounded history of recent lines plus a broadcast channel
//! - `ScriptCatalog` - named scripts discovered in a directory
//! - `ScriptRunner` - spawns scripts and streams their output into the hub
//!
//! Nothing here is global: the hub is created by the composition root and
//! handed to the runner and to every adapter that needs it.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

mod catalog;
mod error;
mod logs;
mod runner;
mod shutdown;
mod stream;

pub use catalog::{ScriptCatalog, ScriptInfo};
pub use error::RunnerError;
pub use logs::{DEFAULT_HISTORY_LINES, HubMessage, LogHub};
pub use runner::{RunHandle, RunOutcome, RunnerConfig, ScriptRunner};
