//! Script handlers - list, run and stop catalog scripts.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use logcast_runtime::ScriptInfo;
use serde::Serialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Response for an accepted run request.
#[derive(Debug, Serialize)]
pub struct RunAccepted {
    pub script: String,
}

/// List all known scripts.
pub async fn list(State(state): State<AppState>) -> Json<Vec<ScriptInfo>> {
    Json(state.runner.catalog().list())
}

/// Names of the scripts currently running.
pub async fn running(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.runner.running())
}

/// Start a script. Output arrives on the socket and the SSE stream.
pub async fn run(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<RunAccepted>), HttpError> {
    let handle = state.runner.start(&name)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RunAccepted {
            script: handle.script().to_string(),
        }),
    ))
}

/// Stop a running script.
pub async fn stop(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.runner.stop(&name)?;
    Ok(StatusCode::ACCEPTED)
}
