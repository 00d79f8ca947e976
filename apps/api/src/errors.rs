use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Provider error: {message}")]
    Provider {
        message: String,
        details: Option<Value>,
    },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Malformed analysis: {}", .0.join("; "))]
    MalformedAnalysis(Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => {
                AppError::Config("Completion provider API key is not configured".to_string())
            }
            LlmError::Api { status, body } => AppError::Provider {
                message: format!("Completion provider returned status {status}"),
                details: serde_json::from_str(&body)
                    .ok()
                    .or_else(|| (!body.is_empty()).then(|| Value::String(body))),
            },
            other => AppError::Provider {
                message: format!("Failed to get response from completion provider: {other}"),
                details: None,
            },
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::MissingApiKey => {
                AppError::Config("Extraction provider API key is not configured".to_string())
            }
            ExtractionError::Upload(msg) => AppError::Upload(msg),
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", msg)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Provider { message, details: d } => {
                tracing::error!("Provider error: {message} {d:?}");
                details = d;
                (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_ERROR", message)
            }
            AppError::Upload(msg) => {
                tracing::error!("Upload error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_ERROR", msg)
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_ERROR", msg)
            }
            AppError::MalformedAnalysis(problems) => {
                tracing::error!("Malformed analysis output: {problems:?}");
                details = Some(json!(problems));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_ANALYSIS",
                    "The analysis provider returned malformed output".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
