//! Tail command handler.
//!
//! Connects a live tail to a running server and echoes every `log_update`
//! to stdout. Connection state changes go to stderr so stdout stays a clean
//! copy of the log.

use logcast_client::{ClientConfig, LiveTail, ReconnectPolicy};
use logcast_core::{LogSinkView, Retention};
use tracing::debug;

use crate::commands::TailArgs;
use crate::error::CliError;
use crate::presentation::{StdoutRenderer, status_label};

/// Client configuration for these arguments.
pub fn client_config(args: &TailArgs) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_origin(&args.url)?;
    config.replay = args.replay;
    config.viewport_rows = args.rows;
    config.retention = args.max_bytes.map_or(Retention::Unbounded, Retention::MaxBytes);
    if args.no_reconnect {
        config.reconnect = ReconnectPolicy::never();
    }
    Ok(config)
}

/// Follow the server until Ctrl-C, or until the connection gives up.
pub async fn execute(args: &TailArgs) -> Result<(), CliError> {
    let config = client_config(args)?;
    let view = LogSinkView::new(config.display_buffer()).with_renderer(StdoutRenderer::stdout());
    let tail = LiveTail::new(config.connection(), view);

    let endpoint = tail.connection().endpoint().clone();
    eprintln!("Connecting to {endpoint}...");

    let mut status = tail.connection().watch_status();
    let indicator = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            eprintln!("[{}]", status_label(current));
        }
    });

    tail.start();

    let interrupted = tokio::select! {
        () = tail.connection().closed() => false,
        _ = tokio::signal::ctrl_c() => {
            debug!("interrupted, closing connection");
            tail.close();
            tail.connection().closed().await;
            true
        }
    };
    indicator.abort();

    if !interrupted && tail.connection().connection_count() == 0 {
        return Err(CliError::Connection(format!("could not connect to {endpoint}")));
    }
    Ok(())
}
