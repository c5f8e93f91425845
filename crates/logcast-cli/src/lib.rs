//! logcast command-line interface.
//!
//! `main.rs` is the composition root; this library holds the parser,
//! bootstrap and command handlers so they can be tested directly.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ScriptArgs, ServeArgs, TailArgs};
pub use error::CliError;
pub use parser::Cli;
