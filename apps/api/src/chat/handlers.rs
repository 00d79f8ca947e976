use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::chat::prompts::career_guide_system;
use crate::chat::service::{send_message, ChatReply};
use crate::errors::AppError;
use crate::models::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub chat_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatResponse {
    pub success: bool,
    pub chat_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub chats: Vec<Session>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/smart-bot/new
pub async fn handle_new_chat(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<NewChatResponse>, AppError> {
    let session = state
        .sessions
        .create(user.user_id, &career_guide_system())
        .await?;

    Ok(Json(NewChatResponse {
        success: true,
        chat_id: session.id,
    }))
}

/// POST /api/smart-bot/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = send_message(&state, user.user_id, req.chat_id, &req.message).await?;
    Ok(Json(reply))
}

/// GET /api/smart-bot/history
///
/// System prompts are stripped and chats with nothing left to show are omitted.
pub async fn handle_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<HistoryResponse>, AppError> {
    let chats = state
        .sessions
        .list(user.user_id)
        .await?
        .iter()
        .map(Session::without_system)
        .filter(|s| !s.messages.is_empty())
        .collect();

    Ok(Json(HistoryResponse {
        success: true,
        chats,
    }))
}

/// DELETE /api/smart-bot/chat/:chatId
pub async fn handle_delete_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.sessions.delete(user.user_id, chat_id).await? {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Chat deleted successfully".to_string(),
    }))
}
