//! Run command handler.
//!
//! Runs one script locally. Output takes the same path a remote tail sees:
//! hub messages become channel envelopes, envelopes go through an
//! [`EventRouter`] into a [`LogSinkView`] that echoes to stdout.

use logcast_core::{DisplayBuffer, EventRouter, LogSinkView, Renderer, Retention};
use logcast_runtime::{HubMessage, RunOutcome};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::StdoutRenderer;

/// Local runs only echo output, so the view keeps a bounded tail.
const LOCAL_RETENTION_BYTES: usize = 1024 * 1024;

/// Run `script` and echo its output to stdout.
pub async fn execute(ctx: &CliContext, script: &str) -> Result<RunOutcome, CliError> {
    run_with_renderer(ctx, script, StdoutRenderer::stdout()).await
}

/// Run `script`, rendering its output through `renderer`.
///
/// Returns the outcome of a successful run. A non-zero exit, a signal or a
/// Ctrl-C stop become [`CliError::ScriptFailed`].
pub async fn run_with_renderer(
    ctx: &CliContext,
    script: &str,
    renderer: impl Renderer + 'static,
) -> Result<RunOutcome, CliError> {
    let router = EventRouter::new();
    let mut view = LogSinkView::new(
        DisplayBuffer::default().with_retention(Retention::MaxBytes(LOCAL_RETENTION_BYTES)),
    )
    .with_renderer(renderer);
    view.attach(&router);

    let mut messages = ctx.hub.subscribe();

    let handle = match ctx.runner.start(script) {
        Ok(handle) => handle,
        Err(e) => {
            drain(&mut messages, &router);
            return Err(e.into());
        }
    };

    let wait = handle.wait();
    tokio::pin!(wait);

    let outcome = loop {
        tokio::select! {
            biased;
            message = messages.recv() => match message {
                Ok(message) => forward(&router, &message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "output arrived faster than it could be shown");
                }
                Err(RecvError::Closed) => break wait.await?,
            },
            result = &mut wait => break result?,
            _ = tokio::signal::ctrl_c() => {
                debug!(script, "interrupted, stopping script");
                if let Err(e) = ctx.runner.stop(script) {
                    debug!(error = %e, "script already finished");
                }
            }
        }
    };

    // The run task pushes its closing banner before it resolves.
    drain(&mut messages, &router);

    if outcome.success {
        Ok(outcome)
    } else {
        Err(CliError::ScriptFailed {
            script: outcome.script,
            code: outcome.code,
        })
    }
}

fn forward(router: &EventRouter, message: &HubMessage) {
    match message.to_envelope() {
        Ok(envelope) => {
            router.dispatch_envelope(&envelope);
        }
        Err(e) => warn!(error = %e, "dropping unencodable hub message"),
    }
}

fn drain(messages: &mut Receiver<HubMessage>, router: &EventRouter) {
    loop {
        match messages.try_recv() {
            Ok(message) => forward(router, &message),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "output arrived faster than it could be shown");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
