use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthUser, Recruiter};
use crate::credits::ledger::{self, Feature};
use crate::errors::AppError;
use crate::export::{attachment, render, ExportQuery};
use crate::models::template::TemplateRow;
use crate::resumes::content::{non_empty, validate_title, ResumeContent};
use crate::resumes::handlers::{persist_charged, CreatedResumeResponse};
use crate::resumes::repo::NewResume;
use crate::state::AppState;
use crate::templates::repo::{self, cap_metadata, Counter, Seniority, TemplateFields};

#[derive(Debug, Default, Deserialize)]
pub struct TemplateFilter {
    pub industry: Option<String>,
    pub seniority: Option<Seniority>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    pub industry: String,
    pub seniority: Seniority,
    pub description: Option<String>,
    pub content: ResumeContent,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub sample_questions: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    pub industry: Option<String>,
    pub seniority: Option<Seniority>,
    pub description: Option<String>,
    pub content: Option<ResumeContent>,
    pub tips: Option<Vec<String>>,
    pub red_flags: Option<Vec<String>>,
    pub sample_questions: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// Optional title for the resume created from a template.
#[derive(Debug, Default, Deserialize)]
pub struct UseTemplateRequest {
    pub title: Option<String>,
}

fn require_industry(industry: &str) -> Result<String, AppError> {
    let industry = industry.trim();
    if industry.is_empty() {
        return Err(AppError::Validation("industry is required".to_string()));
    }
    Ok(industry.to_string())
}

fn content_value(mut content: ResumeContent) -> Result<serde_json::Value, AppError> {
    content.normalize();
    content.validate()?;
    serde_json::to_value(&content).map_err(|e| AppError::Internal(e.into()))
}

impl CreateTemplateRequest {
    fn into_fields(self) -> Result<TemplateFields, AppError> {
        Ok(TemplateFields {
            title: validate_title(&self.title)?,
            industry: require_industry(&self.industry)?,
            seniority: self.seniority,
            description: non_empty(self.description),
            content: content_value(self.content)?,
            tips: cap_metadata(self.tips),
            red_flags: cap_metadata(self.red_flags),
            sample_questions: cap_metadata(self.sample_questions),
            is_published: self.is_published,
        })
    }
}

impl UpdateTemplateRequest {
    fn merge_into(self, row: TemplateRow) -> Result<TemplateFields, AppError> {
        let seniority = match self.seniority {
            Some(seniority) => seniority,
            None => serde_json::from_value(serde_json::Value::String(row.seniority.clone()))
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored seniority is invalid: {e}")))?,
        };
        Ok(TemplateFields {
            title: match self.title {
                Some(title) => validate_title(&title)?,
                None => row.title,
            },
            industry: match self.industry {
                Some(industry) => require_industry(&industry)?,
                None => row.industry,
            },
            seniority,
            description: match self.description {
                Some(description) => non_empty(Some(description)),
                None => row.description,
            },
            content: match self.content {
                Some(content) => content_value(content)?,
                None => row.content,
            },
            tips: self.tips.map(cap_metadata).unwrap_or(row.tips),
            red_flags: self.red_flags.map(cap_metadata).unwrap_or(row.red_flags),
            sample_questions: self
                .sample_questions
                .map(cap_metadata)
                .unwrap_or(row.sample_questions),
            is_published: self.is_published.unwrap_or(row.is_published),
        })
    }
}

/// GET /api/v1/templates?industry=&seniority=
pub async fn handle_list_templates(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(filter): Query<TemplateFilter>,
) -> Result<Json<Vec<TemplateRow>>, AppError> {
    let industry = non_empty(filter.industry);
    let rows = repo::list_published(&state.db, industry.as_deref(), filter.seniority).await?;
    Ok(Json(rows))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateRow>, AppError> {
    let template = repo::touch_visible(&state.db, id, user.id, Counter::Views).await?;
    Ok(Json(template))
}

/// GET /api/v1/templates/:id/download?format=
pub async fn handle_download_template(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let template = repo::get_visible(&state.db, id, user.id).await?;
    let content: ResumeContent = serde_json::from_value(template.content)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored template {id} is invalid: {e}")))?;
    let bytes = render(&content, &template.title, query.format)?;
    repo::touch_visible(&state.db, id, user.id, Counter::Downloads).await?;
    info!("Template {id} downloaded as {}", query.format.extension());
    Ok(attachment(bytes, &template.title, query.format))
}

/// POST /api/v1/templates/:id/use
pub async fn handle_use_template(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<UseTemplateRequest>>,
) -> Result<(StatusCode, Json<CreatedResumeResponse>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let template = repo::get_visible(&state.db, id, user.id).await?;
    let title = match non_empty(req.title) {
        Some(title) => validate_title(&title)?,
        None => validate_title(&template.title)?,
    };
    let content: ResumeContent = serde_json::from_value(template.content)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored template {id} is invalid: {e}")))?;

    let charge = ledger::charge(&state.db, user.id, Feature::ResumeCreate, None).await?;
    let resume = persist_charged(&state.db, &charge, &NewResume::new(title, content)).await?;
    info!("Resume {} created from template {id}", resume.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedResumeResponse {
            resume,
            credits_used: charge.credits_used,
            remaining_credits: charge.remaining_credits,
        }),
    ))
}

/// POST /api/v1/templates
pub async fn handle_create_template(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateRow>), AppError> {
    let fields = req.into_fields()?;
    let template = repo::insert(&state.db, user.id, &fields).await?;
    info!("Recruiter {} created template {}", user.id, template.id);
    Ok((StatusCode::CREATED, Json(template)))
}

/// PUT /api/v1/templates/:id
pub async fn handle_update_template(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<TemplateRow>, AppError> {
    let existing = repo::get_owned(&state.db, id, user.id).await?;
    let fields = req.merge_into(existing)?;
    Ok(Json(repo::update(&state.db, id, user.id, &fields).await?))
}

/// DELETE /api/v1/templates/:id
pub async fn handle_delete_template(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repo::delete_owned(&state.db, id, user.id).await?;
    info!("Recruiter {} deleted template {id}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/recruiter/templates
pub async fn handle_list_own_templates(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
) -> Result<Json<Vec<TemplateRow>>, AppError> {
    Ok(Json(repo::list_for_recruiter(&state.db, user.id).await?))
}
