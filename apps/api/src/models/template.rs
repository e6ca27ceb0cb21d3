use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub title: String,
    pub industry: String,
    pub seniority: String,
    pub description: Option<String>,
    pub content: Value,
    pub tips: Vec<String>,
    pub red_flags: Vec<String>,
    pub sample_questions: Vec<String>,
    pub is_published: bool,
    pub downloads: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
