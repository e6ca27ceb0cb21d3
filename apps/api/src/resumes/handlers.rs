use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::keywords::{match_keywords, KeywordReport};
use crate::auth::AuthUser;
use crate::credits::ledger::{self, Charge, Feature};
use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeSummaryRow};
use crate::resumes::completeness::{compute_completeness_report, CompletenessReport};
use crate::resumes::content::{non_empty, validate_title, ResumeContent};
use crate::resumes::feedback::{review_content, BulletFeedback};
use crate::resumes::repo::{self, NewResume};
use crate::resumes::storage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    pub content: ResumeContent,
    pub target_job_title: Option<String>,
    pub target_company: Option<String>,
    pub job_description: Option<String>,
}

/// Omitted fields are left unchanged; a blank optional field is cleared.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub content: Option<ResumeContent>,
    pub target_job_title: Option<String>,
    pub target_company: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResumeResponse {
    pub resume: ResumeRow,
    pub credits_used: i32,
    pub remaining_credits: i32,
}

#[derive(Debug, Serialize)]
pub struct ResumeDetailResponse {
    pub resume: ResumeRow,
    pub keywords: KeywordReport,
    pub completeness: CompletenessReport,
    pub feedback: Vec<BulletFeedback>,
}

/// Inserts a resume paid for by `charge`. The charge is refunded if the insert
/// fails and linked to the new row if it succeeds.
pub async fn persist_charged(
    pool: &PgPool,
    charge: &Charge,
    new: &NewResume,
) -> Result<ResumeRow, AppError> {
    let inserted = repo::insert(pool, charge.user_id, new).await;
    let row = ledger::refund_if_failed(pool, charge, inserted).await?;
    // The resume exists and was paid for; a missing link only affects history.
    if let Err(e) = ledger::attach_resume(pool, charge, row.id).await {
        warn!("Could not link usage {} to resume {}: {e}", charge.usage_id, row.id);
    }
    info!("Created resume {} for user {}", row.id, charge.user_id);
    Ok(row)
}

pub fn detail_for(resume: ResumeRow) -> Result<ResumeDetailResponse, AppError> {
    let content = repo::content_of(&resume)?;
    let keywords = match_keywords(
        &content.to_plain_text(),
        resume.job_description.as_deref().unwrap_or_default(),
    );
    Ok(ResumeDetailResponse {
        keywords,
        completeness: compute_completeness_report(&content),
        feedback: review_content(&content),
        resume,
    })
}

/// Applies an update to a loaded row. Returns whether stored scores are now stale.
fn apply_update(row: &mut ResumeRow, req: UpdateResumeRequest) -> Result<bool, AppError> {
    let mut stale = false;

    if let Some(title) = req.title {
        row.title = validate_title(&title)?;
    }
    if let Some(mut content) = req.content {
        content.normalize();
        content.validate()?;
        let value = serde_json::to_value(&content).map_err(anyhow::Error::from)?;
        if value != row.content {
            row.content = value;
            stale = true;
        }
    }
    if let Some(title) = req.target_job_title {
        row.target_job_title = non_empty(Some(title));
    }
    if let Some(company) = req.target_company {
        row.target_company = non_empty(Some(company));
    }
    if let Some(jd) = req.job_description {
        let jd = non_empty(Some(jd));
        if jd != row.job_description {
            row.job_description = jd;
            stale = true;
        }
    }

    Ok(stale)
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ResumeSummaryRow>>, AppError> {
    Ok(Json(repo::list_for_user(&state.db, user.id).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<CreatedResumeResponse>), AppError> {
    let title = validate_title(&req.title)?;
    let mut content = req.content;
    content.normalize();
    content.validate()?;

    let charge = ledger::charge(&state.db, user.id, Feature::ResumeCreate, None).await?;

    let mut new = NewResume::new(title, content);
    new.target_job_title = non_empty(req.target_job_title);
    new.target_company = non_empty(req.target_company);
    new.job_description = non_empty(req.job_description);
    let resume = persist_charged(&state.db, &charge, &new).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResumeResponse {
            resume,
            credits_used: charge.credits_used,
            remaining_credits: charge.remaining_credits,
        }),
    ))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let resume = repo::get_owned(&state.db, id, user.id).await?;
    Ok(Json(detail_for(resume)?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let mut resume = repo::get_owned(&state.db, id, user.id).await?;
    let stale = apply_update(&mut resume, req)?;
    let resume = repo::update(&state.db, &resume, stale).await?;
    Ok(Json(detail_for(resume)?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if let Some(key) = repo::delete_owned(&state.db, id, user.id).await? {
        storage::delete_source(&state.s3, &state.config.s3_bucket, &key).await;
    }
    info!("Deleted resume {id} for user {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/source
pub async fn handle_download_source(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = repo::get_owned(&state.db, id, user.id).await?;
    let key = resume
        .source_file_key
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} has no uploaded source file")))?;

    let (bytes, content_type) = storage::get_source(&state.s3, &state.config.s3_bucket, &key).await?;
    let file_name = key.rsplit('/').next().unwrap_or("resume").to_string();

    Ok((
        [
            (
                header::CONTENT_TYPE,
                content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::content::fixtures::sample_content;
    use chrono::Utc;

    fn row() -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend".into(),
            content: serde_json::to_value(sample_content()).unwrap(),
            target_job_title: None,
            target_company: None,
            job_description: Some("We need Rust and Kubernetes".into()),
            ats_score: Some(70),
            keyword_score: Some(50),
            analysis: None,
            source_file_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_title_only_update_keeps_scores() {
        let mut resume = row();
        let stale = apply_update(
            &mut resume,
            UpdateResumeRequest {
                title: Some("  Platform  ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!stale);
        assert_eq!(resume.title, "Platform");
    }

    #[test]
    fn test_content_or_jd_change_marks_scores_stale() {
        let mut resume = row();
        let mut content = sample_content();
        content.skills.push("Kubernetes".into());
        let stale = apply_update(
            &mut resume,
            UpdateResumeRequest {
                content: Some(content),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(stale);

        let mut resume = row();
        let stale = apply_update(
            &mut resume,
            UpdateResumeRequest {
                job_description: Some("Go and Terraform".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(stale);
    }

    #[test]
    fn test_resubmitting_same_content_is_not_stale() {
        let mut resume = row();
        let stale = apply_update(
            &mut resume,
            UpdateResumeRequest {
                content: Some(sample_content()),
                job_description: Some("We need Rust and Kubernetes".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!stale);
    }

    #[test]
    fn test_invalid_content_is_rejected() {
        let mut resume = row();
        let mut content = sample_content();
        content.personal_info.email = "not-an-email".into();
        let result = apply_update(
            &mut resume,
            UpdateResumeRequest {
                content: Some(content),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_detail_reports_keywords_against_stored_jd() {
        let detail = detail_for(row()).unwrap();
        assert_eq!(detail.keywords.relevant, vec!["rust", "kubernetes"]);
        assert_eq!(detail.keywords.matched, vec!["rust"]);
        assert_eq!(detail.keywords.score, 50);
        assert!(detail.completeness.overall_score > 0);
    }
}
