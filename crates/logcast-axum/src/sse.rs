//! SSE log stream.
//!
//! Mirrors the socket channel for clients that only need a one-way feed:
//! each log line is sent as a `log` event, each status change as
//! `script_status`.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use logcast_core::SCRIPT_STATUS;
use logcast_runtime::{HubMessage, LogHub};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// SSE event name for log lines.
pub const LOG_EVENT: &str = "log";

/// Stream hub messages, optionally preceded by the current history.
///
/// The stream owns its receiver and does not borrow `hub`.
/// Includes a keep-alive ping every 30 seconds to prevent proxy timeouts.
pub fn log_stream(
    hub: &LogHub,
    replay: bool,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static + use<>> {
    let (history, receiver) = if replay {
        hub.subscribe_with_history()
    } else {
        (Vec::new(), hub.subscribe())
    };

    let backlog = tokio_stream::iter(history.into_iter().map(HubMessage::Line));
    let live = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(msg) => Some(msg),
        Err(e) => {
            // Lagged receivers skip ahead
            tracing::debug!("SSE stream error: {}", e);
            None
        }
    });

    let stream = backlog
        .chain(live)
        .filter_map(|msg| to_event(&msg).map(Ok));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

fn to_event(msg: &HubMessage) -> Option<Event> {
    let (name, json) = match msg {
        HubMessage::Line(line) => (LOG_EVENT, serde_json::to_string(line)),
        HubMessage::Status(status) => (SCRIPT_STATUS, serde_json::to_string(status)),
    };

    match json {
        Ok(json) => Some(Event::default().event(name).data(json)),
        Err(e) => {
            tracing::warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
