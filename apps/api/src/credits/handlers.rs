use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::credits::ledger::{get_subscription, usage_history, Feature};
use crate::errors::AppError;
use crate::models::credits::{CreditUsageRow, SubscriptionRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FeatureCost {
    pub feature: Feature,
    pub cost: i32,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub credits: i32,
    pub subscription: Option<SubscriptionRow>,
    pub unlimited: bool,
    pub costs: Vec<FeatureCost>,
}

pub fn cost_table() -> Vec<FeatureCost> {
    Feature::ALL
        .into_iter()
        .map(|feature| FeatureCost {
            feature,
            cost: feature.cost(),
        })
        .collect()
}

/// GET /api/v1/credits
pub async fn handle_get_credits(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<CreditsResponse>, AppError> {
    let subscription = get_subscription(&state.db, user.id).await?;
    let unlimited = subscription
        .as_ref()
        .is_some_and(|s| s.covers_paid_features(chrono::Utc::now()));

    Ok(Json(CreditsResponse {
        credits: user.credits,
        subscription,
        unlimited,
        costs: cost_table(),
    }))
}

/// GET /api/v1/credits/usage
pub async fn handle_usage_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CreditUsageRow>>, AppError> {
    Ok(Json(usage_history(&state.db, user.id).await?))
}
