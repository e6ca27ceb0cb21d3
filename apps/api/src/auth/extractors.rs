use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{info, warn};

use super::claims::{verify_session_token, SessionClaims};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated caller, resolved to (and upserted as) a `users` row.
pub struct AuthUser(pub User);

/// An authenticated caller allowed to author templates.
pub struct Recruiter(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = verify_session_token(
            token,
            &state.config.auth_jwt_secret,
            state.config.auth_issuer.as_deref(),
        )
        .map_err(|e| {
            warn!("Invalid session token: {e}");
            AppError::Unauthorized("invalid or expired session token".to_string())
        })?;

        let user = upsert_user(&state.db, &claims, state.config.signup_credits).await?;
        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Recruiter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.can_manage_templates() {
            return Err(AppError::Forbidden);
        }
        Ok(Recruiter(user))
    }
}

/// Reads the `Bearer <token>` value from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("invalid auth scheme".to_string()))
}

/// First sight of a provider subject creates the user with the signup grant;
/// later requests refresh email and name.
async fn upsert_user(
    pool: &sqlx::PgPool,
    claims: &SessionClaims,
    signup_credits: i32,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (external_id, email, name, credits)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (external_id) DO UPDATE
            SET email = EXCLUDED.email,
                name = COALESCE(EXCLUDED.name, users.name),
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&claims.sub)
    .bind(&claims.email)
    .bind(&claims.name)
    .bind(signup_credits)
    .fetch_one(pool)
    .await?;

    if user.created_at == user.updated_at {
        info!("Registered user {} ({})", user.id, user.email);
    }
    Ok(user)
}
