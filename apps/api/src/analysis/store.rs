//! Analysis persistence. Results are insert-only and kept indefinitely.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisResult, AnalysisRow};

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), AppError>;

    /// Most recent result for `owner_id`, or across all owners when `None`.
    async fn latest(&self, owner_id: Option<Uuid>) -> Result<Option<AnalysisResult>, AppError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize analysis: {e}")))
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, result: &AnalysisResult) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO analyses
                (id, session_id, owner_id, created_at, skills, career1, career2, career3, raw_response)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(result.id)
        .bind(result.session_id)
        .bind(result.owner_id)
        .bind(result.timestamp)
        .bind(to_json(&result.analysis.skills)?)
        .bind(to_json(&result.analysis.career1)?)
        .bind(to_json(&result.analysis.career2)?)
        .bind(to_json(&result.analysis.career3)?)
        .bind(&result.raw_response)
        .execute(&self.pool)
        .await?;

        info!(
            "Stored analysis {} for chat {} (owner {})",
            result.id, result.session_id, result.owner_id
        );
        Ok(())
    }

    async fn latest(&self, owner_id: Option<Uuid>) -> Result<Option<AnalysisResult>, AppError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT * FROM analyses
            WHERE $1::uuid IS NULL OR owner_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AnalysisResult::try_from)
            .transpose()
            .map_err(|e| AppError::Internal(anyhow!("Stored analysis is corrupt: {e}")))
    }
}
