pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::chat::handlers as chat_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Leave some slack above the document ceiling for the other multipart
    // fields and framing.
    let body_limit = state.config.max_document_bytes + 64 * 1024;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/chat", post(chat_handlers::handle_chat))
        .route(
            "/api/v1/job-descriptions/analyze",
            post(analysis_handlers::handle_analyze),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
