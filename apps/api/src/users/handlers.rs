use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::credits::ledger::get_subscription;
use crate::errors::AppError;
use crate::models::credits::SubscriptionRow;
use crate::models::user::{User, ROLE_ADMIN, ROLE_JOB_SEEKER, ROLE_RECRUITER};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub credits: i32,
    /// Present only while the plan is active.
    pub subscription: Option<SubscriptionRow>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Roles a user may pick for themselves.
fn self_assignable_role(role: &str) -> Result<&'static str, AppError> {
    match role.trim() {
        ROLE_JOB_SEEKER => Ok(ROLE_JOB_SEEKER),
        ROLE_RECRUITER => Ok(ROLE_RECRUITER),
        ROLE_ADMIN => Err(AppError::Validation(
            "The admin role cannot be self-assigned".to_string(),
        )),
        other => Err(AppError::Validation(format!("Unknown role '{other}'"))),
    }
}

/// GET /api/v1/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let now = chrono::Utc::now();
    let subscription = get_subscription(&state.db, user.id)
        .await?
        .filter(|s| s.covers_paid_features(now));
    Ok(Json(MeResponse {
        credits: user.credits,
        user,
        subscription,
    }))
}

/// PUT /api/v1/me/role
pub async fn handle_update_role(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<User>, AppError> {
    let role = self_assignable_role(&req.role)?;
    if user.role == ROLE_ADMIN {
        // Admin is granted out of band.
        return Err(AppError::Forbidden);
    }

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(role)
    .fetch_one(&state.db)
    .await?;

    info!("User {} switched role to {role}", user.id);
    Ok(Json(updated))
}
