//! Client configuration.

use logcast_core::buffer::DEFAULT_VIEWPORT_ROWS;
use logcast_core::{ChannelError, DisplayBuffer, Retention};
use url::Url;

use crate::connection::ConnectionHandle;
use crate::endpoint::{socket_endpoint, with_replay};
use crate::reconnect::ReconnectPolicy;

/// Settings for a live tail client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint (already derived from the origin).
    pub endpoint: Url,
    pub reconnect: ReconnectPolicy,
    /// Ask the server for its history on the first connection.
    pub replay: bool,
    pub viewport_rows: usize,
    pub retention: Retention,
}

impl ClientConfig {
    /// Defaults for the server at `origin` (see [`socket_endpoint`]).
    pub fn from_origin(origin: &str) -> Result<Self, ChannelError> {
        Ok(Self::with_endpoint(socket_endpoint(origin)?))
    }

    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            endpoint,
            reconnect: ReconnectPolicy::default(),
            replay: false,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,
            retention: Retention::Unbounded,
        }
    }

    /// Connection handle for these settings, not yet connected.
    pub fn connection(&self) -> ConnectionHandle {
        if self.replay {
            ConnectionHandle::with_reconnect_endpoint(
                with_replay(&self.endpoint),
                Some(self.endpoint.clone()),
                self.reconnect.clone(),
            )
        } else {
            ConnectionHandle::new(self.endpoint.clone(), self.reconnect.clone())
        }
    }

    /// Empty display buffer for these settings.
    pub fn display_buffer(&self) -> DisplayBuffer {
        DisplayBuffer::new(self.viewport_rows).with_retention(self.retention)
    }
}
