//! Composition root for the Axum server.
//!
//! Builds the log hub, scans the scripts directory and wires the runner.
//! Nothing is global: every handler reaches the hub through [`AxumContext`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use logcast_runtime::{
    DEFAULT_HISTORY_LINES, LogHub, RunnerConfig, ScriptCatalog, ScriptRunner,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// CORS configuration for the API routes.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development default).
    #[default]
    AllowAll,
    /// Allow only the listed origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory scanned for runnable scripts.
    pub scripts_dir: PathBuf,
    /// Interpreter command prefixed to each script, e.g. `python3 -u`.
    pub interpreter: Option<String>,
    /// Lines kept for late joiners and `GET /api/logs`.
    pub history_lines: usize,
    /// Clear the history when a script starts.
    pub clear_on_run: bool,
    pub cors: CorsConfig,
}

impl ServerConfig {
    pub fn with_defaults() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            scripts_dir: PathBuf::from("scripts"),
            interpreter: Some("python3 -u".to_string()),
            history_lines: DEFAULT_HISTORY_LINES,
            clear_on_run: true,
            cors: CorsConfig::default(),
        }
    }

    #[must_use]
    pub fn with_scripts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.scripts_dir = path.into();
        self
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            interpreter: self.interpreter.clone(),
            clear_on_run: self.clear_on_run,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Services shared by every handler.
#[derive(Debug)]
pub struct AxumContext {
    pub hub: Arc<LogHub>,
    pub runner: Arc<ScriptRunner>,
}

impl AxumContext {
    pub fn new(hub: Arc<LogHub>, runner: Arc<ScriptRunner>) -> Self {
        Self { hub, runner }
    }

    /// Context over an existing runner, sharing its hub.
    pub fn from_runner(runner: ScriptRunner) -> Self {
        let hub = Arc::clone(runner.hub());
        Self::new(hub, Arc::new(runner))
    }
}

/// Build the context for `config`.
///
/// A missing scripts directory is not fatal: the server still streams logs,
/// it just has nothing to run.
pub fn bootstrap(config: &ServerConfig) -> AxumContext {
    let hub = Arc::new(LogHub::new(config.history_lines));

    let catalog = match ScriptCatalog::scan(&config.scripts_dir) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "starting without scripts");
            ScriptCatalog::new()
        }
    };

    info!(
        scripts_dir = %config.scripts_dir.display(),
        scripts = catalog.len(),
        interpreter = config.interpreter.as_deref().unwrap_or("<none>"),
        history_lines = config.history_lines,
        "Axum bootstrap complete"
    );

    let runner = ScriptRunner::new(catalog, Arc::clone(&hub), config.runner_config());
    AxumContext::new(hub, Arc::new(runner))
}

/// Bootstrap and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("logcast web server listening on http://{}", listener.local_addr()?);
    serve(listener, app).await
}

/// Serve `app` on `listener`, shutting down gracefully on Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    serve_until(listener, app, shutdown_signal()).await
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve_until(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("logcast web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
