//! Axum route handlers for PDF and image processing.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::chat::service::send_message;
use crate::errors::AppError;
use crate::extraction::pipeline::{self, preview_message};
use crate::extraction::upload::receive;
use crate::extraction::FileKind;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    pub message: String,
    pub extracted_text: String,
}

/// POST /api/smart-bot/process-pdf
pub async fn handle_process_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    process(state, user, multipart, FileKind::Pdf).await
}

/// POST /api/smart-bot/process-image
pub async fn handle_process_image(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    process(state, user, multipart, FileKind::Image).await
}

/// Extracts text from the upload; with a `chatId` the merged text becomes the
/// next user message of that chat, otherwise a preview is returned.
async fn process(
    state: AppState,
    user: AuthUser,
    multipart: Multipart,
    kind: FileKind,
) -> Result<Response, AppError> {
    let form = receive(
        multipart,
        &state.config.upload_dir,
        state.config.max_upload_bytes,
        kind,
    )
    .await?;

    // Resolve the target chat before any provider call.
    if let Some(chat_id) = form.chat_id {
        if state.sessions.find(user.user_id, chat_id).await?.is_none() {
            form.file.cleanup();
            return Err(AppError::NotFound("Chat not found".to_string()));
        }
    }

    let extracted = pipeline::run(state.extractor.as_ref(), form.file, &form.instructions).await?;

    match form.chat_id {
        Some(chat_id) => {
            let reply = send_message(&state, user.user_id, chat_id, &extracted.combined).await?;
            Ok(Json(reply).into_response())
        }
        None => Ok(Json(ExtractionResponse {
            success: true,
            message: preview_message(extracted.kind, &extracted.text),
            extracted_text: extracted.text,
        })
        .into_response()),
    }
}
