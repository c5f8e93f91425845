//! Stopping a script together with everything it spawned.
//!
//! Scripts are spawned as process-group leaders, so a stop signals the whole
//! group: SIGTERM first, SIGKILL once the grace period runs out. Grandchildren
//! that inherited the output pipes die with the script and the log readers
//! see EOF.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
#[cfg(unix)]
use tracing::debug;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{Signal, killpg};
#[cfg(unix)]
use nix::unistd::Pid;

/// How long a stopped script gets to exit after SIGTERM.
pub const STOP_GRACE: Duration = Duration::from_secs(5);

/// Terminate `child` and its process group, then reap it.
pub async fn terminate_group(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        terminate_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn terminate_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped
        return child.wait().await;
    };
    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    let group = Pid::from_raw(raw);

    match killpg(group, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => return Err(io::Error::other(e)),
    }

    let status = match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            debug!(pid, "script ignored SIGTERM, killing process group");
            signal_group(group, Signal::SIGKILL);
            child.wait().await?
        }
    };

    // The leader may exit on SIGTERM while members trap it.
    signal_group(group, Signal::SIGKILL);
    Ok(status)
}

#[cfg(unix)]
fn signal_group(group: Pid, signal: Signal) {
    match killpg(group, signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => debug!(%group, %signal, error = %e, "failed to signal process group"),
    }
}
