//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers, the extension popup has no fixed origin)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/analyze", post(http::http_post_analyze))
        .route("/api/v1/quiz", post(http::http_post_quiz))
        .route("/api/v1/grade", post(http::http_post_grade))
        .route("/api/v1/respond", post(http::http_post_respond))
        .route("/api/v1/library", get(http::http_get_library).post(http::http_post_library))
        .route("/api/v1/library/similar/:id", get(http::http_get_library_similar))
        .route("/api/v1/library/grouped", get(http::http_get_library_grouped))
        .route("/api/v1/quiz/result", post(http::http_post_quiz_result))
        .route("/api/v1/quiz/history", get(http::http_get_quiz_history))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
