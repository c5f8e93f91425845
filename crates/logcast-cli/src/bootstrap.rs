//! CLI bootstrap - the composition root for local commands.
//!
//! Builds the log hub, scans the scripts directory and wires both into a
//! [`ScriptRunner`]. `serve` composes its own context in `logcast-axum`;
//! `tail` needs no local infrastructure at all.

use std::path::PathBuf;
use std::sync::Arc;

use logcast_runtime::{DEFAULT_HISTORY_LINES, LogHub, RunnerConfig, ScriptCatalog, ScriptRunner};
use tracing::debug;

use crate::commands::ScriptArgs;
use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory scanned for scripts.
    pub scripts_dir: PathBuf,
    /// Interpreter prefixed to each script, `None` to execute directly.
    pub interpreter: Option<String>,
    /// Lines kept in the local hub's history.
    pub history_lines: usize,
}

impl CliConfig {
    /// Create config with default paths.
    pub fn with_defaults() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            interpreter: Some("python3 -u".to_string()),
            history_lines: DEFAULT_HISTORY_LINES,
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl From<&ScriptArgs> for CliConfig {
    fn from(args: &ScriptArgs) -> Self {
        Self {
            scripts_dir: args.scripts_dir.clone(),
            interpreter: args.interpreter(),
            ..Self::with_defaults()
        }
    }
}

/// Fully composed context for local commands.
pub struct CliContext {
    pub hub: Arc<LogHub>,
    pub runner: ScriptRunner,
}

/// Scan the scripts directory and compose the runner.
///
/// Unlike the server, a missing scripts directory is an error here: every
/// local command needs the catalog.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let catalog = ScriptCatalog::scan(&config.scripts_dir)?;
    debug!(
        dir = %config.scripts_dir.display(),
        scripts = catalog.len(),
        "scanned scripts directory"
    );

    let hub = Arc::new(LogHub::new(config.history_lines));
    let runner_config = RunnerConfig {
        interpreter: config.interpreter.clone(),
        ..RunnerConfig::with_defaults()
    };
    let runner = ScriptRunner::new(catalog, Arc::clone(&hub), runner_config);

    Ok(CliContext { hub, runner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_scans_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();

        let config = CliConfig {
            scripts_dir: dir.path().to_path_buf(),
            ..CliConfig::with_defaults()
        };
        let ctx = bootstrap(&config).unwrap();
        assert!(ctx.runner.catalog().get("main").is_some());
        assert!(Arc::ptr_eq(&ctx.hub, ctx.runner.hub()));
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            scripts_dir: dir.path().join("absent"),
            ..CliConfig::with_defaults()
        };
        let err = bootstrap(&config).err().unwrap();
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 78);
    }
}
