use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::sanitize::truncate_chars;
use crate::errors::AppError;
use crate::models::template::TemplateRow;

pub const MAX_METADATA_ITEMS: usize = 20;
pub const MAX_METADATA_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl Seniority {
    pub fn as_str(self) -> &'static str {
        match self {
            Seniority::Entry => "entry",
            Seniority::Mid => "mid",
            Seniority::Senior => "senior",
            Seniority::Executive => "executive",
        }
    }
}

/// Column values for an insert or a full update.
#[derive(Debug, Clone)]
pub struct TemplateFields {
    pub title: String,
    pub industry: String,
    pub seniority: Seniority,
    pub description: Option<String>,
    pub content: Value,
    pub tips: Vec<String>,
    pub red_flags: Vec<String>,
    pub sample_questions: Vec<String>,
    pub is_published: bool,
}

/// Trims, drops blanks, and caps a metadata list at 20 items of 300 characters.
pub fn cap_metadata(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_METADATA_ITEMS)
        .map(|item| truncate_chars(&item, MAX_METADATA_CHARS))
        .collect()
}

pub async fn list_published(
    pool: &PgPool,
    industry: Option<&str>,
    seniority: Option<Seniority>,
) -> Result<Vec<TemplateRow>, AppError> {
    let rows = sqlx::query_as::<_, TemplateRow>(
        r#"
        SELECT * FROM templates
        WHERE is_published
          AND ($1::text IS NULL OR lower(industry) = lower($1))
          AND ($2::text IS NULL OR seniority = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(industry)
    .bind(seniority.map(Seniority::as_str))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_for_recruiter(pool: &PgPool, recruiter_id: Uuid) -> Result<Vec<TemplateRow>, AppError> {
    let rows = sqlx::query_as::<_, TemplateRow>(
        "SELECT * FROM templates WHERE recruiter_id = $1 ORDER BY created_at DESC",
    )
    .bind(recruiter_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// A template the viewer may see: published, or their own.
pub async fn get_visible(pool: &PgPool, id: Uuid, viewer_id: Uuid) -> Result<TemplateRow, AppError> {
    sqlx::query_as::<_, TemplateRow>(
        "SELECT * FROM templates WHERE id = $1 AND (is_published OR recruiter_id = $2)",
    )
    .bind(id)
    .bind(viewer_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}

/// Which counter a read bumps.
#[derive(Debug, Clone, Copy)]
pub enum Counter {
    Views,
    Downloads,
}

/// Increments a counter on a visible template and returns the updated row
/// in the same statement.
pub async fn touch_visible(
    pool: &PgPool,
    id: Uuid,
    viewer_id: Uuid,
    counter: Counter,
) -> Result<TemplateRow, AppError> {
    let sql = match counter {
        Counter::Views => {
            "UPDATE templates SET views = views + 1 \
             WHERE id = $1 AND (is_published OR recruiter_id = $2) RETURNING *"
        }
        Counter::Downloads => {
            "UPDATE templates SET downloads = downloads + 1 \
             WHERE id = $1 AND (is_published OR recruiter_id = $2) RETURNING *"
        }
    };
    sqlx::query_as::<_, TemplateRow>(sql)
        .bind(id)
        .bind(viewer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}

pub async fn get_owned(pool: &PgPool, id: Uuid, recruiter_id: Uuid) -> Result<TemplateRow, AppError> {
    sqlx::query_as::<_, TemplateRow>("SELECT * FROM templates WHERE id = $1 AND recruiter_id = $2")
        .bind(id)
        .bind(recruiter_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}

pub async fn insert(pool: &PgPool, recruiter_id: Uuid, fields: &TemplateFields) -> Result<TemplateRow, AppError> {
    let row = sqlx::query_as::<_, TemplateRow>(
        r#"
        INSERT INTO templates
            (recruiter_id, title, industry, seniority, description, content,
             tips, red_flags, sample_questions, is_published)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(recruiter_id)
    .bind(&fields.title)
    .bind(&fields.industry)
    .bind(fields.seniority.as_str())
    .bind(&fields.description)
    .bind(&fields.content)
    .bind(&fields.tips)
    .bind(&fields.red_flags)
    .bind(&fields.sample_questions)
    .bind(fields.is_published)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    recruiter_id: Uuid,
    fields: &TemplateFields,
) -> Result<TemplateRow, AppError> {
    sqlx::query_as::<_, TemplateRow>(
        r#"
        UPDATE templates
        SET title = $3, industry = $4, seniority = $5, description = $6, content = $7,
            tips = $8, red_flags = $9, sample_questions = $10, is_published = $11,
            updated_at = now()
        WHERE id = $1 AND recruiter_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(recruiter_id)
    .bind(&fields.title)
    .bind(&fields.industry)
    .bind(fields.seniority.as_str())
    .bind(&fields.description)
    .bind(&fields.content)
    .bind(&fields.tips)
    .bind(&fields.red_flags)
    .bind(&fields.sample_questions)
    .bind(fields.is_published)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Template {id} not found")))
}

pub async fn delete_owned(pool: &PgPool, id: Uuid, recruiter_id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM templates WHERE id = $1 AND recruiter_id = $2")
        .bind(id)
        .bind(recruiter_id)
        .execute(pool)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Template {id} not found")));
    }
    Ok(())
}
