//! Command handlers.
//!
//! Handlers are thin: they turn parsed arguments into configuration, call
//! into the runtime, client or server crates, and format terminal output.

pub mod run;
pub mod scripts;
pub mod serve;
pub mod tail;
