//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::job::run_analysis;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::analysis::AnalysisPayload;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub formatted_response_filename: String,
    pub analysis: AnalysisPayload,
}

#[derive(Debug, Serialize)]
pub struct LatestAnalysisResponse {
    pub analysis: AnalysisPayload,
}

/// POST /api/smart-bot/analyze/:chatId
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let outcome = run_analysis(&state, user.user_id, chat_id).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        message: "Chat analysis saved successfully".to_string(),
        filename: outcome.filename,
        formatted_response_filename: outcome.formatted_response_filename,
        analysis: outcome.result.analysis,
    }))
}

/// GET /api/analysis/user/analysis
///
/// Public. With a bearer token the caller's latest analysis is returned,
/// otherwise the latest overall.
pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> Result<Json<LatestAnalysisResponse>, AppError> {
    let latest = state
        .analyses
        .latest(user.map(|u| u.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound("No analysis found".to_string()))?;

    Ok(Json(LatestAnalysisResponse {
        analysis: latest.analysis,
    }))
}
