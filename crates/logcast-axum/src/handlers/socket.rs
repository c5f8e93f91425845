//! WebSocket event channel.
//!
//! `GET /socket` upgrades to a WebSocket that carries one JSON envelope per
//! text frame: `log_update` for every hub line and `script_status` for run
//! lifecycle changes. The channel is push-only; inbound text is ignored.
//!
//! With `?replay=true` the current history is sent first. History and live
//! lines are split atomically, so nothing is duplicated or dropped.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use logcast_core::Envelope;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::handlers::logs::ReplayParams;
use crate::state::AppState;

/// `GET /socket` - upgrade to the event channel.
pub async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<ReplayParams>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session(socket, state, params.replay))
}

async fn session(socket: WebSocket, state: AppState, replay: bool) {
    let (history, mut receiver) = if replay {
        state.hub.subscribe_with_history()
    } else {
        (Vec::new(), state.hub.subscribe())
    };
    let (mut sender, mut inbound) = socket.split();

    info!(replay, backlog = history.len(), "socket session opened");

    for line in &history {
        if !send_envelope(&mut sender, &line.to_envelope()).await {
            debug!("socket closed during replay");
            return;
        }
    }

    loop {
        tokio::select! {
            message = receiver.recv() => match message {
                Ok(message) => {
                    let envelope = match message.to_envelope() {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            warn!(error = %e, "failed to encode hub message");
                            continue;
                        }
                    };
                    if !send_envelope(&mut sender, &envelope).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "socket session lagged behind the hub");
                }
                Err(RecvError::Closed) => break,
            },
            frame = inbound.next() => match frame {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                // Ping/pong is handled by axum; nothing else is expected.
                Some(Ok(_)) => {}
            },
        }
    }

    info!("socket session closed");
}

/// Send one envelope. Returns `false` once the socket is gone.
async fn send_envelope(sender: &mut SplitSink<WebSocket, Message>, envelope: &Envelope) -> bool {
    let text = match envelope.to_json() {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, event = %envelope.event, "failed to encode envelope");
            return true;
        }
    };
    sender.send(Message::Text(text.into())).await.is_ok()
}
