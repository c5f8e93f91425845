//! Log history handlers.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;
use logcast_core::LogLine;
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters shared by the streaming endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReplayParams {
    /// Send the current history before live lines.
    #[serde(default)]
    pub replay: bool,
}

/// `GET /api/logs` - current history, oldest first.
pub async fn history(State(state): State<AppState>) -> Json<Vec<LogLine>> {
    Json(state.hub.history())
}

/// `DELETE /api/logs` - drop the history.
pub async fn clear(State(state): State<AppState>) -> StatusCode {
    state.hub.clear();
    tracing::info!("log history cleared");
    StatusCode::NO_CONTENT
}

/// `GET /api/logs/stream` - SSE feed of log lines and script statuses.
pub async fn stream(
    State(state): State<AppState>,
    Query(params): Query<ReplayParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    crate::sse::log_stream(&state.hub, params.replay)
}
