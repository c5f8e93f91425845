//! Commands enum and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use logcast_core::buffer::DEFAULT_VIEWPORT_ROWS;
use logcast_runtime::DEFAULT_HISTORY_LINES;

/// Where scripts live and how to launch them.
#[derive(Debug, Clone, Args)]
pub struct ScriptArgs {
    /// Directory scanned for scripts (name = file stem)
    #[arg(long = "scripts-dir", env = "LOGCAST_SCRIPTS_DIR", default_value = "scripts")]
    pub scripts_dir: PathBuf,

    /// Interpreter prefixed to each script; pass "" to execute scripts directly
    #[arg(long, env = "LOGCAST_INTERPRETER", default_value = "python3 -u")]
    pub interpreter: String,
}

impl ScriptArgs {
    /// `None` when scripts should be executed directly.
    pub fn interpreter(&self) -> Option<String> {
        let trimmed = self.interpreter.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Arguments of `logcast serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "LOGCAST_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, env = "LOGCAST_PORT", default_value_t = 8050)]
    pub port: u16,
    #[command(flatten)]
    pub scripts: ScriptArgs,
    /// Number of log lines kept for late joiners
    #[arg(long, env = "LOGCAST_HISTORY", default_value_t = DEFAULT_HISTORY_LINES)]
    pub history: usize,
    /// Keep the previous run's output when a script starts
    #[arg(long)]
    pub keep_history: bool,
    /// Restrict CORS to these origins (comma separated)
    #[arg(long = "allow-origin", env = "LOGCAST_ALLOW_ORIGINS", value_delimiter = ',')]
    pub allow_origins: Vec<String>,
}

/// Arguments of `logcast tail`.
#[derive(Debug, Clone, Args)]
pub struct TailArgs {
    /// Server origin (http://host:port) or socket URL (ws://host:port/socket)
    #[arg(env = "LOGCAST_URL", default_value = "http://127.0.0.1:8050")]
    pub url: String,
    /// Print the server's recent history before live output
    #[arg(long)]
    pub replay: bool,
    /// Exit when the connection drops instead of reconnecting
    #[arg(long)]
    pub no_reconnect: bool,
    /// Viewport height of the display buffer
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_ROWS)]
    pub rows: usize,
    /// Keep at most this many bytes of output in memory
    #[arg(long)]
    pub max_bytes: Option<usize>,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the live-tail page, the event channel and the script API
    Serve(ServeArgs),

    /// Follow the log stream of a running server
    Tail(TailArgs),

    /// Run a script locally, printing its output as it arrives
    Run {
        /// Script name (file stem in the scripts directory)
        script: String,
        #[command(flatten)]
        scripts: ScriptArgs,
    },

    /// List the scripts available to run
    Scripts {
        #[command(flatten)]
        scripts: ScriptArgs,
    },
}
