//! Chat turn orchestration.
//!
//! Flow: find session → trim history + new user message → completion →
//!       format → append user/assistant pair → write chat log record.
//!
//! Nothing is persisted until the provider has answered, so a failed turn
//! leaves the session exactly as it was.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chat::formatter::format_response;
use crate::chat::trimmer::trim_context;
use crate::errors::AppError;
use crate::llm_client::{ChatTurn, CompletionParams, LlmError};
use crate::logs::format_exchange;
use crate::models::session::{Message, Role};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub chat_id: Uuid,
}

/// Runs one user turn against an existing session and returns the formatted reply.
pub async fn send_message(
    state: &AppState,
    owner_id: Uuid,
    chat_id: Uuid,
    text: &str,
) -> Result<ChatReply, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let session = state
        .sessions
        .find(owner_id, chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    let user_message = Message::new(Role::User, text);
    let mut history = session.messages;
    history.push(user_message.clone());

    let context: Vec<ChatTurn> = trim_context(&history)
        .into_iter()
        .map(|m| ChatTurn::new(m.role, m.content.as_str()))
        .collect();
    info!(
        "Trimmed chat {chat_id} history from {} to {} messages",
        history.len(),
        context.len()
    );

    let raw = state
        .completion
        .complete(&context, &CompletionParams::chat())
        .await?;
    let formatted = format_response(&raw);
    if formatted.is_empty() {
        warn!("Completion for chat {chat_id} was empty after formatting");
        return Err(LlmError::EmptyContent.into());
    }

    let assistant_message = Message::new(Role::Assistant, formatted.clone());
    state
        .sessions
        .append(owner_id, chat_id, &[user_message, assistant_message])
        .await?;

    let now = Utc::now();
    let record = format_exchange(chat_id, now, text, &formatted);
    if let Err(e) = state.chat_log.write_record("chat", chat_id, now, &record).await {
        warn!("Failed to write chat log for {chat_id}: {e}");
    }

    Ok(ChatReply {
        success: true,
        response: formatted,
        chat_id,
    })
}
