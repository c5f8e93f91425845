//! Axum-specific error types and mappings.
//!
//! Maps [`RunnerError`] to HTTP status codes and a JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logcast_runtime::RunnerError;
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict with the current state (e.g. script already running).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The script process could not be started.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<RunnerError> for HttpError {
    fn from(err: RunnerError) -> Self {
        let message = err.to_string();
        match err {
            RunnerError::NotFound(_) | RunnerError::NotRunning(_) => Self::NotFound(message),
            RunnerError::AlreadyRunning(_) => Self::Conflict(message),
            RunnerError::Spawn { .. } => Self::ServiceUnavailable(message),
            RunnerError::Catalog { .. } | RunnerError::Internal(_) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_errors_map_to_status() {
        let cases = [
            (RunnerError::NotFound("a".into()), StatusCode::NOT_FOUND),
            (RunnerError::NotRunning("a".into()), StatusCode::NOT_FOUND),
            (RunnerError::AlreadyRunning("a".into()), StatusCode::CONFLICT),
            (
                RunnerError::Spawn {
                    script: "a".into(),
                    reason: "no such file".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                RunnerError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = HttpError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
