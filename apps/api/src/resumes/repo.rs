use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::resumes::content::ResumeContent;

/// Fields for a new resume row. The id is chosen by the caller so an uploaded
/// source file can be keyed by it before the row exists.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub id: Uuid,
    pub title: String,
    pub content: ResumeContent,
    pub target_job_title: Option<String>,
    pub target_company: Option<String>,
    pub job_description: Option<String>,
    pub source_file_key: Option<String>,
}

impl NewResume {
    pub fn new(title: String, content: ResumeContent) -> Self {
        NewResume {
            id: Uuid::new_v4(),
            title,
            content,
            target_job_title: None,
            target_company: None,
            job_description: None,
            source_file_key: None,
        }
    }
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeSummaryRow>, AppError> {
    let rows = sqlx::query_as::<_, ResumeSummaryRow>(
        r#"
        SELECT id, title, target_job_title, target_company, ats_score, keyword_score,
               source_file_key IS NOT NULL AS has_source_file, updated_at
        FROM resumes
        WHERE user_id = $1
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Loads a resume owned by `user_id`. Someone else's resume is indistinguishable
/// from a missing one.
pub async fn get_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn insert(pool: &PgPool, user_id: Uuid, new: &NewResume) -> Result<ResumeRow, AppError> {
    let content = serde_json::to_value(&new.content).map_err(anyhow::Error::from)?;
    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes
            (id, user_id, title, content, target_job_title, target_company,
             job_description, source_file_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(user_id)
    .bind(&new.title)
    .bind(content)
    .bind(&new.target_job_title)
    .bind(&new.target_company)
    .bind(&new.job_description)
    .bind(&new.source_file_key)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Writes every editable field back. `clear_scores` drops the stored ATS and
/// keyword scores along with the last analysis.
pub async fn update(pool: &PgPool, row: &ResumeRow, clear_scores: bool) -> Result<ResumeRow, AppError> {
    let updated = sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes
        SET title = $3,
            content = $4,
            target_job_title = $5,
            target_company = $6,
            job_description = $7,
            ats_score = CASE WHEN $8 THEN NULL ELSE ats_score END,
            keyword_score = CASE WHEN $8 THEN NULL ELSE keyword_score END,
            analysis = CASE WHEN $8 THEN NULL ELSE analysis END,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(row.user_id)
    .bind(&row.title)
    .bind(&row.content)
    .bind(&row.target_job_title)
    .bind(&row.target_company)
    .bind(&row.job_description)
    .bind(clear_scores)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", row.id)))?;
    Ok(updated)
}

/// Stores a completed analysis. A `job_description` replaces the stored one,
/// so the scores always describe the JD kept on the record.
pub async fn save_analysis(
    pool: &PgPool,
    id: Uuid,
    ats_score: i32,
    keyword_score: i32,
    analysis: Value,
    job_description: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE resumes
        SET ats_score = $2,
            keyword_score = $3,
            analysis = $4,
            job_description = COALESCE($5, job_description),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(ats_score)
    .bind(keyword_score)
    .bind(analysis)
    .bind(job_description)
    .execute(pool)
    .await?;
    Ok(())
}

/// Deletes the resume and returns its source file key, if it had one.
pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<String>, AppError> {
    let deleted: Option<Option<String>> = sqlx::query_scalar(
        "DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING source_file_key",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    deleted.ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// Decodes the stored jsonb content.
pub fn content_of(row: &ResumeRow) -> Result<ResumeContent, AppError> {
    serde_json::from_value(row.content.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored content for resume {} is invalid: {e}", row.id)))
}
