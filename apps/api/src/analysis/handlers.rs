use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::ats::{analyze_resume, AtsAnalysis};
use crate::analysis::generator::{draft_content, GenerateRequest};
use crate::analysis::matching::{rank_candidates, CandidateMatch};
use crate::analysis::optimizer::{optimize_content, OptimizationResult};
use crate::analysis::parser::structure_resume_text;
use crate::analysis::upload::{extract_text, read_upload_form, UploadForm, UploadedFile};
use crate::auth::{AuthUser, Recruiter};
use crate::credits::ledger::{self, Charge, Feature};
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::content::{non_empty, validate_title, ResumeContent};
use crate::resumes::handlers::{persist_charged, CreatedResumeResponse};
use crate::resumes::repo::{self, NewResume};
use crate::resumes::storage;
use crate::state::AppState;

/// Maximum candidate files per matching request.
pub const MAX_MATCH_FILES: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub job_description: Option<String>,
    #[serde(default)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: AtsAnalysis,
    pub credits_used: i32,
    pub remaining_credits: i32,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    #[serde(flatten)]
    pub optimization: OptimizationResult,
    pub applied: bool,
    /// The saved record when `apply` was set.
    pub resume: Option<ResumeRow>,
    pub credits_used: i32,
    pub remaining_credits: i32,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub candidates: Vec<CandidateMatch>,
    pub credits_used: i32,
    pub remaining_credits: i32,
}

/// Credits are returned when the model was unavailable and the caller only
/// got the keyword estimate.
async fn settle_analysis(state: &AppState, charge: &Charge, analysis: AtsAnalysis) -> AnalyzeResponse {
    if analysis.is_fallback {
        ledger::refund_after_failure(&state.db, charge).await;
        return AnalyzeResponse {
            analysis,
            credits_used: 0,
            remaining_credits: charge.remaining_credits + charge.credits_used,
        };
    }
    AnalyzeResponse {
        analysis,
        credits_used: charge.credits_used,
        remaining_credits: charge.remaining_credits,
    }
}

async fn store_analysis(
    pool: &PgPool,
    resume_id: Uuid,
    analysis: &AtsAnalysis,
    job_description: Option<&str>,
) -> Result<(), AppError> {
    let stored = serde_json::to_value(analysis).map_err(anyhow::Error::from)?;
    repo::save_analysis(
        pool,
        resume_id,
        i32::from(analysis.ats_score),
        i32::from(analysis.keyword_match_score),
        stored,
        job_description,
    )
    .await?;
    info!(
        "Stored ATS analysis for resume {resume_id} (score {})",
        analysis.ats_score
    );
    Ok(())
}

async fn apply_optimization(
    pool: &PgPool,
    mut resume: ResumeRow,
    content: &ResumeContent,
    job_description: Option<String>,
) -> Result<ResumeRow, AppError> {
    resume.content = serde_json::to_value(content).map_err(anyhow::Error::from)?;
    if job_description.is_some() {
        resume.job_description = job_description;
    }
    let saved = repo::update(pool, &resume, true).await?;
    info!("Applied optimization to resume {}", saved.id);
    Ok(saved)
}

fn single_file<'a>(form: &'a UploadForm) -> Result<&'a UploadedFile, AppError> {
    form.files_named("file")
        .next()
        .ok_or_else(|| AppError::Validation("'file' is required".to_string()))
}

/// POST /api/v1/resumes/:id/analyze
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let resume = repo::get_owned(&state.db, id, user.id).await?;
    let content = repo::content_of(&resume)?;

    let override_jd = non_empty(req.job_description);
    let job_description = override_jd
        .clone()
        .or_else(|| resume.job_description.clone())
        .unwrap_or_default();

    let charge = ledger::charge(&state.db, user.id, Feature::AtsAnalysis, Some(resume.id)).await?;
    let analysis = analyze_resume(&state.llm, &content.to_plain_text(), &job_description).await;

    if !analysis.is_fallback {
        let stored = store_analysis(&state.db, resume.id, &analysis, override_jd.as_deref()).await;
        ledger::refund_if_failed(&state.db, &charge, stored).await?;
    }

    Ok(Json(settle_analysis(&state, &charge, analysis).await))
}

/// POST /api/v1/analyze
/// One-off analysis of an uploaded file. Nothing is stored.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = read_upload_form(multipart, 1).await?;
    let file = single_file(&form)?;
    let job_description = form.require_text("job_description")?;
    let resume_text = extract_text(file).await?;

    let charge = ledger::charge(&state.db, user.id, Feature::AtsAnalysis, None).await?;
    let analysis = analyze_resume(&state.llm, &resume_text, job_description).await;

    Ok(Json(settle_analysis(&state, &charge, analysis).await))
}

/// POST /api/v1/resumes/:id/optimize
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let resume = repo::get_owned(&state.db, id, user.id).await?;
    let content = repo::content_of(&resume)?;

    let override_jd = non_empty(req.job_description);
    let job_description = override_jd
        .clone()
        .or_else(|| resume.job_description.clone())
        .ok_or_else(|| {
            AppError::Validation(
                "job_description is required when the resume has none stored".to_string(),
            )
        })?;

    let charge = ledger::charge(&state.db, user.id, Feature::Optimize, Some(resume.id)).await?;
    let optimized = optimize_content(&state.llm, &content, &job_description).await;
    let optimization = ledger::refund_if_failed(&state.db, &charge, optimized).await?;

    let saved = if req.apply {
        let applied = apply_optimization(&state.db, resume, &optimization.content, override_jd).await;
        Some(ledger::refund_if_failed(&state.db, &charge, applied).await?)
    } else {
        None
    };

    Ok(Json(OptimizeResponse {
        optimization,
        applied: saved.is_some(),
        resume: saved,
        credits_used: charge.credits_used,
        remaining_credits: charge.remaining_credits,
    }))
}

/// POST /api/v1/generate
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<CreatedResumeResponse>), AppError> {
    let title = validate_title(&req.title)?;
    req.validate()?;
    let mut contact_only = ResumeContent {
        personal_info: req.personal_info.clone(),
        ..Default::default()
    };
    contact_only.normalize();
    contact_only.validate()?;

    let charge = ledger::charge(&state.db, user.id, Feature::Generate, None).await?;
    let mut request = req;
    request.personal_info = contact_only.personal_info;
    let drafted = draft_content(&state.llm, &request).await;
    let content = ledger::refund_if_failed(&state.db, &charge, drafted).await?;

    let mut new = NewResume::new(title, content);
    new.target_job_title = non_empty(Some(request.target_job_title));
    new.target_company = non_empty(request.target_company);
    new.job_description = non_empty(request.job_description);
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

/// POST /api/v1/resumes/upload
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResumeResponse>), AppError> {
    let form = read_upload_form(multipart, 1).await?;
    let file = single_file(&form)?;
    let title = validate_title(form.require_text("title")?)?;
    let resume_text = extract_text(file).await?;

    let charge = ledger::charge(&state.db, user.id, Feature::ResumeCreate, None).await?;
    let parsed = structure_resume_text(&state.llm, &resume_text).await;
    let content = ledger::refund_if_failed(&state.db, &charge, parsed).await?;

    let mut new = NewResume::new(title, content);
    let key = storage::source_key(user.id, new.id, file.kind.extension());
    let stored = storage::put_source(
        &state.s3,
        &state.config.s3_bucket,
        &key,
        file.bytes.clone(),
        file.kind.content_type(),
    )
    .await;
    ledger::refund_if_failed(&state.db, &charge, stored).await?;

    new.source_file_key = Some(key.clone());
    new.target_job_title = form.text("target_job_title").map(str::to_string);
    new.target_company = form.text("target_company").map(str::to_string);
    new.job_description = form.text("job_description").map(str::to_string);

    let resume = match persist_charged(&state.db, &charge, &new).await {
        Ok(resume) => resume,
        Err(e) => {
            storage::delete_source(&state.s3, &state.config.s3_bucket, &key).await;
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreatedResumeResponse {
            resume,
            credits_used: charge.credits_used,
            remaining_credits: charge.remaining_credits,
        }),
    ))
}

/// POST /api/v1/recruiter/match
pub async fn handle_match_candidates(
    State(state): State<AppState>,
    Recruiter(user): Recruiter,
    multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let form = read_upload_form(multipart, MAX_MATCH_FILES).await?;
    let requirements = form.require_text("job_requirements")?;

    let mut candidates = Vec::new();
    for file in form.files_named("resumes") {
        candidates.push((file.file_name.as_str(), extract_text(file).await?));
    }
    if candidates.is_empty() {
        return Err(AppError::Validation(
            "Upload at least one file under 'resumes'".to_string(),
        ));
    }

    let charge = ledger::charge(&state.db, user.id, Feature::CandidateMatch, None).await?;

    let mut matches = Vec::with_capacity(candidates.len());
    for (name, text) in &candidates {
        matches.push(state.candidate_matcher.score(name, text, requirements).await);
    }
    info!(
        "Matched {} candidate(s) for recruiter {}",
        matches.len(),
        user.id
    );

    Ok(Json(MatchResponse {
        candidates: rank_candidates(matches),
        credits_used: charge.credits_used,
        remaining_credits: charge.remaining_credits,
    }))
}
