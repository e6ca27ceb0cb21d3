use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::export::{attachment, render, ExportQuery};
use crate::resumes::repo;
use crate::state::AppState;

/// GET /api/v1/resumes/:id/download?format=pdf|docx|txt
pub async fn handle_download_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let resume = repo::get_owned(&state.db, id, user.id).await?;
    let content = repo::content_of(&resume)?;
    let bytes = render(&content, &resume.title, query.format)?;
    info!(
        "Exported resume {id} as {} ({} bytes)",
        query.format.extension(),
        bytes.len()
    );
    Ok(attachment(bytes, &resume.title, query.format))
}
