//! Serve command handler.
//!
//! Starts the HTTP server: live-tail page, `/socket` event channel and the
//! script API.

use logcast_axum::{ServerConfig, start_server};
use tracing::info;

use crate::commands::ServeArgs;
use crate::error::CliError;

/// Server configuration for these arguments.
pub fn server_config(args: &ServeArgs) -> ServerConfig {
    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        scripts_dir: args.scripts.scripts_dir.clone(),
        interpreter: args.scripts.interpreter(),
        history_lines: args.history,
        clear_on_run: !args.keep_history,
        ..ServerConfig::with_defaults()
    };

    if args.allow_origins.is_empty() {
        config
    } else {
        config.with_allowed_origins(args.allow_origins.clone())
    }
}

/// Run the server until Ctrl-C.
pub async fn execute(args: &ServeArgs) -> Result<(), CliError> {
    let config = server_config(args);
    info!(
        "Serving {} on http://{}:{}",
        config.scripts_dir.display(),
        config.host,
        config.port
    );

    start_server(config)
        .await
        .map_err(|e: anyhow::Error| CliError::Server(format!("{e:#}")))
}
