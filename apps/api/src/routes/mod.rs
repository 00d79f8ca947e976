pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::chat::handlers as chat;
use crate::extraction::handlers as extraction;
use crate::state::AppState;

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(health::welcome_handler))
        .route("/health", get(health::health_handler))
        // Smart bot chat
        .route("/api/smart-bot/new", post(chat::handle_new_chat))
        .route("/api/smart-bot/chat", post(chat::handle_chat))
        .route("/api/smart-bot/history", get(chat::handle_history))
        .route(
            "/api/smart-bot/chat/:chat_id",
            delete(chat::handle_delete_chat),
        )
        .route(
            "/api/smart-bot/analyze/:chat_id",
            post(analysis::handle_analyze),
        )
        // File extraction
        .route(
            "/api/smart-bot/process-pdf",
            post(extraction::handle_process_pdf).layer(upload_limit.clone()),
        )
        .route(
            "/api/smart-bot/process-image",
            post(extraction::handle_process_image).layer(upload_limit),
        )
        // Analysis dashboard
        .route(
            "/api/analysis/user/analysis",
            get(analysis::handle_latest_analysis),
        )
        .with_state(state)
}
