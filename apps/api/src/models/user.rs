use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_JOB_SEEKER: &str = "job_seeker";
pub const ROLE_RECRUITER: &str = "recruiter";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can_manage_templates(&self) -> bool {
        matches!(self.role.as_str(), ROLE_RECRUITER | ROLE_ADMIN)
    }
}
