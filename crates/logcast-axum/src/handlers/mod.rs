//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers over the log hub and the script runner.

pub mod logs;
pub mod page;
pub mod scripts;
pub mod socket;
