//! Route definitions and router construction.
//!
//! # Path Parameter Syntax
//! Axum 0.8 uses brace syntax for path parameters: `{name}`

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/logs",
            get(handlers::logs::history).delete(handlers::logs::clear),
        )
        .route("/logs/stream", get(handlers::logs::stream))
        .route("/scripts", get(handlers::scripts::list))
        .route("/scripts/running", get(handlers::scripts::running))
        .route("/scripts/{name}/run", post(handlers::scripts::run))
        .route("/scripts/{name}/stop", post(handlers::scripts::stop))
}

/// Create the main router: page, event channel, health check and API.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/socket", get(handlers::socket::upgrade))
        .route("/health", get(health_check))
        .with_state(Arc::clone(&state))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
