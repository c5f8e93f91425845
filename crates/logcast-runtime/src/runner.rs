//! Script runner.
//!
//! Spawns catalog scripts as child processes, streams their stdout/stderr
//! into the [`LogHub`] and frames each run with start/finish banners.

use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logcast_core::{LogSource, ScriptStatus};
use serde::Serialize;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::ScriptCatalog;
use crate::error::RunnerError;
use crate::logs::LogHub;
use crate::shutdown::{STOP_GRACE, terminate_group};
use crate::stream::spawn_stream_reader;

/// How long output may keep flowing after the script itself has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

type RunningMap = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Program (plus leading arguments) used to launch scripts, e.g.
    /// `python3 -u`. When `None`, the script path is executed directly.
    pub interpreter: Option<String>,
    /// Drop the hub history before each run.
    pub clear_on_run: bool,
}

impl RunnerConfig {
    pub const fn with_defaults() -> Self {
        Self {
            interpreter: None,
            clear_on_run: true,
        }
    }

    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub script: String,
    /// Exit code, `None` when killed by a signal or never awaited.
    pub code: Option<i32>,
    pub success: bool,
    /// The run was stopped through [`ScriptRunner::stop`].
    pub cancelled: bool,
}

/// Handle to a started run.
#[derive(Debug)]
pub struct RunHandle {
    script: String,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Wait until the process has exited and its output has been drained.
    pub async fn wait(self) -> Result<RunOutcome, RunnerError> {
        self.task
            .await
            .map_err(|e| RunnerError::Internal(format!("run task for {}: {e}", self.script)))
    }
}

/// Launches catalog scripts and supervises them until exit.
#[derive(Debug)]
pub struct ScriptRunner {
    catalog: ScriptCatalog,
    hub: Arc<LogHub>,
    config: RunnerConfig,
    running: RunningMap,
}

impl ScriptRunner {
    pub fn new(catalog: ScriptCatalog, hub: Arc<LogHub>, config: RunnerConfig) -> Self {
        Self {
            catalog,
            hub,
            config,
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub const fn catalog(&self) -> &ScriptCatalog {
        &self.catalog
    }

    pub const fn hub(&self) -> &Arc<LogHub> {
        &self.hub
    }

    /// Start `name`. Must be called from within a tokio runtime.
    ///
    /// An unknown name is reported to the hub as well as returned, so
    /// watchers see why nothing happened.
    pub fn start(&self, name: &str) -> Result<RunHandle, RunnerError> {
        let Some(path) = self.catalog.get(name).map(Path::to_path_buf) else {
            self.hub.system(format!("Script {name} not found."));
            self.hub.announce(ScriptStatus::missing(name));
            return Err(RunnerError::NotFound(name.to_string()));
        };

        let cancel = CancellationToken::new();
        {
            let mut running = lock(&self.running);
            if running.contains_key(name) {
                return Err(RunnerError::AlreadyRunning(name.to_string()));
            }
            running.insert(name.to_string(), cancel.clone());
        }

        if self.config.clear_on_run {
            self.hub.clear();
        }

        let shown = path.display().to_string();
        self.hub.system(format!("Starting {shown}..."));
        self.hub
            .system(" Please wait a moment, it's being executed.");

        let child = match self.build_command(&path).spawn() {
            Ok(child) => child,
            Err(e) => {
                lock(&self.running).remove(name);
                warn!(script = name, path = %shown, error = %e, "failed to spawn script");
                self.hub.system(format!("Failed to start {shown}: {e}"));
                self.hub.announce(ScriptStatus::failed(name, None));
                return Err(RunnerError::Spawn {
                    script: name.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        info!(script = name, path = %shown, pid = ?child.id(), "script started");
        self.hub.announce(ScriptStatus::started(name));

        let task = tokio::spawn(supervise(
            child,
            name.to_string(),
            shown,
            Arc::clone(&self.hub),
            cancel,
            Arc::clone(&self.running),
        ));

        Ok(RunHandle {
            script: name.to_string(),
            task,
        })
    }

    /// Kill a running script. Its run still ends with the usual banner.
    pub fn stop(&self, name: &str) -> Result<(), RunnerError> {
        let running = lock(&self.running);
        let token = running
            .get(name)
            .ok_or_else(|| RunnerError::NotRunning(name.to_string()))?;
        info!(script = name, "stopping script");
        token.cancel();
        Ok(())
    }

    /// Names of the scripts currently running, sorted.
    pub fn running(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.running).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_running(&self, name: &str) -> bool {
        lock(&self.running).contains_key(name)
    }

    fn build_command(&self, path: &Path) -> Command {
        let mut interpreter = self
            .config
            .interpreter
            .as_deref()
            .map(str::split_whitespace)
            .into_iter()
            .flatten();

        let mut cmd = match interpreter.next() {
            Some(program) => {
                let mut cmd = Command::new(program);
                cmd.args(interpreter).arg(path);
                cmd
            }
            None => Command::new(path),
        };

        cmd.env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

fn lock(running: &RunningMap) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
    running.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn supervise(
    mut child: Child,
    script: String,
    shown: String,
    hub: Arc<LogHub>,
    cancel: CancellationToken,
    running: RunningMap,
) -> RunOutcome {
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_stream_reader(
            stdout,
            LogSource::Stdout,
            script.clone(),
            Arc::clone(&hub),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_stream_reader(
            stderr,
            LogSource::Stderr,
            script.clone(),
            Arc::clone(&hub),
        ));
    }

    let mut cancelled = false;
    let status = tokio::select! {
        status = child.wait() => status,
        () = cancel.cancelled() => {
            cancelled = true;
            terminate_group(&mut child, STOP_GRACE).await
        }
    };

    // Drain output before the closing banner so it is always last. A
    // background process that outlives the script keeps the pipes open, so
    // the drain is bounded.
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    for mut reader in readers {
        match tokio::time::timeout_at(deadline, &mut reader).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(%script, error = %e, "log reader task failed"),
            Err(_) => {
                warn!(%script, "output still open after exit, detaching reader");
                reader.abort();
            }
        }
    }

    lock(&running).remove(&script);

    let outcome = report_exit(&hub, &script, &shown, status, cancelled);
    info!(%script, code = ?outcome.code, success = outcome.success, cancelled, "script finished");
    outcome
}

fn report_exit(
    hub: &LogHub,
    script: &str,
    shown: &str,
    status: std::io::Result<ExitStatus>,
    cancelled: bool,
) -> RunOutcome {
    match status {
        Ok(status) if status.success() => {
            hub.system(format!("{shown} completed successfully."));
            hub.announce(ScriptStatus::succeeded(script));
            RunOutcome {
                script: script.to_string(),
                code: Some(0),
                success: true,
                cancelled,
            }
        }
        Ok(status) => {
            let code = status.code();
            let reason = code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string());
            hub.system(format!(
                "{shown} finished with an error, return code: {reason}"
            ));
            hub.announce(ScriptStatus::failed(script, code));
            RunOutcome {
                script: script.to_string(),
                code,
                success: false,
                cancelled,
            }
        }
        Err(e) => {
            hub.system(format!("{shown} could not be awaited: {e}"));
            hub.announce(ScriptStatus::failed(script, None));
            RunOutcome {
                script: script.to_string(),
                code: None,
                success: false,
                cancelled,
            }
        }
    }
}
