//! Route Configuration
//!
//! Configures all HTTP routes.

use axum::{
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.settings.storage.static_dir.clone();
    let body_limit = state.settings.storage.max_upload_bytes;

    Router::new()
        // WebSocket relay
        .route("/ws/{room}/{username}", get(ws_handler))
        // Rooms
        .route("/history/{room}", get(handlers::room::get_history))
        .route("/create-room/{room}", post(handlers::room::create_room))
        // Files
        .route("/upload_file", post(handlers::files::upload_file))
        .route("/download_file/{file_id}", get(handlers::files::download_file))
        // Voice
        .route("/voice_message", post(handlers::voice::voice_message))
        .route("/voice-translate", post(handlers::voice::voice_translate))
        .route(
            "/supported_languages",
            get(handlers::languages::supported_languages),
        )
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Uploads live under <static_dir>/uploads and are served from here too
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}
