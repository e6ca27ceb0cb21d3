use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Serialized `ResumeContent`.
    pub content: Value,
    pub target_job_title: Option<String>,
    pub target_company: Option<String>,
    pub job_description: Option<String>,
    pub ats_score: Option<i32>,
    pub keyword_score: Option<i32>,
    /// Last persisted `AtsAnalysis`.
    pub analysis: Option<Value>,
    #[serde(skip_serializing)]
    pub source_file_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view projection; omits content and analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub target_job_title: Option<String>,
    pub target_company: Option<String>,
    pub ats_score: Option<i32>,
    pub keyword_score: Option<i32>,
    pub has_source_file: bool,
    pub updated_at: DateTime<Utc>,
}
