//! Connection handle.
//!
//! A [`ConnectionHandle`] owns a background task that connects to the
//! endpoint, decodes envelopes from text frames and dispatches them through
//! an [`EventRouter`]. When the socket drops, the task reconnects according
//! to its [`ReconnectPolicy`]; subscriptions survive reconnects.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use logcast_core::{
    CONNECT, ChannelError, ConnectionStatus, Envelope, EventRouter, EventSource, Handler,
    Subscription,
};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::reconnect::ReconnectPolicy;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// State shared with the background task.
struct Shared {
    router: EventRouter,
    status: watch::Sender<ConnectionStatus>,
    connections: AtomicUsize,
    shutdown: CancellationToken,
    finished: CancellationToken,
}

struct Inner {
    shared: Arc<Shared>,
    endpoint: Url,
    reconnect_endpoint: Option<Url>,
    policy: ReconnectPolicy,
    started: AtomicBool,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
    }
}

/// Handle to one persistent event channel.
///
/// Cloning is cheap; the channel closes when the last clone is dropped or
/// [`ConnectionHandle::close`] is called.
#[derive(Clone)]
pub struct ConnectionHandle {
    inner: Arc<Inner>,
}

impl ConnectionHandle {
    /// Create a handle for `endpoint`. Nothing connects until
    /// [`ConnectionHandle::connect`].
    pub fn new(endpoint: Url, policy: ReconnectPolicy) -> Self {
        Self::with_reconnect_endpoint(endpoint, None, policy)
    }

    /// Like [`ConnectionHandle::new`], using `reconnect_endpoint` for every
    /// connection after the first.
    ///
    /// The live tail connects with `?replay=true` once and reconnects
    /// without it, so a reconnect never replays history into the buffer.
    pub fn with_reconnect_endpoint(
        endpoint: Url,
        reconnect_endpoint: Option<Url>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            inner: Arc::new(Inner {
                shared: Arc::new(Shared {
                    router: EventRouter::new(),
                    status,
                    connections: AtomicUsize::new(0),
                    shutdown: CancellationToken::new(),
                    finished: CancellationToken::new(),
                }),
                endpoint,
                reconnect_endpoint,
                policy,
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Start the connection task. Later calls are no-ops.
    ///
    /// Must be called from within a tokio runtime. Failure to connect is not
    /// reported here: the task retries per policy and the outcome shows up
    /// in [`ConnectionHandle::status`].
    pub fn connect(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!(endpoint = %self.inner.endpoint, "connection already started");
            return;
        }

        let first = self.inner.endpoint.clone();
        let again = self
            .inner
            .reconnect_endpoint
            .clone()
            .unwrap_or_else(|| first.clone());

        tokio::spawn(run(
            Arc::clone(&self.inner.shared),
            first,
            again,
            self.inner.policy.clone(),
        ));
    }

    /// Register `callback` for every successful (re)connection.
    pub fn on_connected(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.on(CONNECT, Arc::new(move |_: &Value| callback()))
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.inner.shared.status.borrow()
    }

    /// Receiver that observes every status change.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.shared.status.subscribe()
    }

    /// Wait until the channel is connected.
    ///
    /// Waits forever if [`ConnectionHandle::connect`] is never called. Fails
    /// with [`ChannelError::Closed`] if the handle gives up first.
    pub async fn wait_connected(&self) -> Result<(), ChannelError> {
        let mut status = self.watch_status();
        tokio::select! {
            result = status.wait_for(|s| s.is_connected()) => {
                result.map(|_| ()).map_err(|_| ChannelError::Closed)
            }
            () = self.inner.shared.finished.cancelled() => Err(ChannelError::Closed),
        }
    }

    /// Resolves once the connection task has stopped for good.
    pub async fn closed(&self) {
        self.inner.shared.finished.cancelled().await;
    }

    /// Stop reconnecting and close the socket.
    pub fn close(&self) {
        info!(endpoint = %self.inner.endpoint, "closing connection");
        self.inner.shared.shutdown.cancel();
    }

    /// Number of successful connections so far.
    pub fn connection_count(&self) -> usize {
        self.inner.shared.connections.load(Ordering::SeqCst)
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Router used for inbound events.
    pub fn router(&self) -> &EventRouter {
        &self.inner.shared.router
    }
}

impl EventSource for ConnectionHandle {
    fn on(&self, event: &str, handler: Handler) -> Subscription {
        self.inner.shared.router.on(event, handler)
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("status", &self.status())
            .field("connections", &self.connection_count())
            .finish_non_exhaustive()
    }
}

/// Why a connected session ended.
enum SessionEnd {
    Shutdown,
    Closed,
    Failed(String),
}

async fn run(shared: Arc<Shared>, first: Url, again: Url, policy: ReconnectPolicy) {
    let mut target = first;
    let mut attempt: u32 = 0;

    loop {
        debug!(endpoint = %target, attempt, "connecting");
        let connected = tokio::select! {
            result = connect_async(target.as_str()) => result,
            () = shared.shutdown.cancelled() => break,
        };

        match connected {
            Ok((socket, _response)) => {
                attempt = 0;
                let count = shared.connections.fetch_add(1, Ordering::SeqCst) + 1;
                shared.status.send_replace(ConnectionStatus::Connected);
                info!(endpoint = %target, connections = count, "connected");
                shared.router.dispatch(CONNECT, &Value::Null);

                let end = session(socket, &shared).await;
                shared.status.send_replace(ConnectionStatus::Disconnected);
                match end {
                    SessionEnd::Shutdown => break,
                    SessionEnd::Closed => info!(endpoint = %target, "connection closed by server"),
                    SessionEnd::Failed(reason) => {
                        warn!(endpoint = %target, %reason, "connection lost");
                    }
                }
                target = again.clone();
            }
            Err(e) => {
                warn!(endpoint = %target, attempt, error = %e, "connect failed");
            }
        }

        let Some(delay) = policy.delay_for(attempt) else {
            info!(endpoint = %target, "not reconnecting");
            break;
        };
        attempt = attempt.saturating_add(1);
        debug!(delay_ms = delay.as_millis(), "reconnecting after delay");

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = shared.shutdown.cancelled() => break,
        }
    }

    shared.status.send_replace(ConnectionStatus::Disconnected);
    shared.finished.cancel();
    debug!("connection task exiting");
}

/// Pump inbound frames until the socket ends or shutdown is requested.
async fn session(socket: Socket, shared: &Shared) -> SessionEnd {
    let (mut sink, mut stream) = socket.split();

    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            () = shared.shutdown.cancelled() => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    debug!(error = %e, "close frame not sent");
                }
                return SessionEnd::Shutdown;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => match Envelope::from_json(text.as_str()) {
                Ok(envelope) => {
                    let handled = shared.router.dispatch_envelope(&envelope);
                    trace!(event = %envelope.event, handled, "event received");
                }
                Err(e) => warn!(error = %e, "dropping undecodable frame"),
            },
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "close frame received");
                return SessionEnd::Closed;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return SessionEnd::Failed(e.to_string()),
            None => return SessionEnd::Closed,
        }
    }
}
