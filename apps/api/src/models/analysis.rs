use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One suggested career path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub title: String,
    pub description: String,
}

/// The validated body of an analysis: 5 skill scores and 3 careers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    /// skill name → score in 0..=10
    pub skills: BTreeMap<String, u8>,
    pub career1: Career,
    pub career2: Career,
    pub career3: Career,
}

/// A stored skill/career summary derived from one conversation.
/// Created once per analysis run and never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub session_id: Uuid,
    pub owner_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub analysis: AnalysisPayload,
    #[serde(skip)]
    pub raw_response: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub skills: Value,
    pub career1: Value,
    pub career2: Value,
    pub career3: Value,
    pub raw_response: String,
}

impl TryFrom<AnalysisRow> for AnalysisResult {
    type Error = serde_json::Error;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(AnalysisResult {
            id: row.id,
            session_id: row.session_id,
            owner_id: row.owner_id,
            timestamp: row.created_at,
            analysis: AnalysisPayload {
                skills: serde_json::from_value(row.skills)?,
                career1: serde_json::from_value(row.career1)?,
                career2: serde_json::from_value(row.career2)?,
                career3: serde_json::from_value(row.career3)?,
            },
            raw_response: row.raw_response,
        })
    }
}
