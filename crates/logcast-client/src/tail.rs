//! Live tail: a log sink view fed by a connection.

use logcast_core::{ConnectionStatus, LogSinkView, Subscription};
use tracing::info;

use crate::config::ClientConfig;
use crate::connection::ConnectionHandle;

/// A [`LogSinkView`] subscribed to a [`ConnectionHandle`].
///
/// The view is attached before the connection starts, so no event delivered
/// on the channel can be missed.
#[derive(Debug)]
pub struct LiveTail {
    connection: ConnectionHandle,
    view: LogSinkView,
    _indicator: Subscription,
}

impl LiveTail {
    pub fn new(connection: ConnectionHandle, mut view: LogSinkView) -> Self {
        view.attach(&connection);

        let endpoint = connection.endpoint().to_string();
        let indicator = connection.on_connected(move || {
            info!(%endpoint, "live tail connected");
        });

        Self {
            connection,
            view,
            _indicator: indicator,
        }
    }

    /// Live tail with a plain view built from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.connection(), LogSinkView::new(config.display_buffer()))
    }

    /// Start connecting. Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.connection.connect();
    }

    /// Run until the connection gives up or is closed.
    pub async fn run(&self) {
        self.start();
        self.connection.closed().await;
    }

    pub fn close(&self) {
        self.connection.close();
    }

    pub const fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub const fn view(&self) -> &LogSinkView {
        &self.view
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }
}
