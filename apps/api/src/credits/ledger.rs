//! Credit ledger: charge and refund paid features.
//!
//! Deduction is one conditional UPDATE committed together with its usage row;
//! a user can never go below zero and a failed check changes nothing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::credits::{CreditUsageRow, SubscriptionRow};

/// Paid features and their credit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ResumeCreate,
    AtsAnalysis,
    Optimize,
    Generate,
    CandidateMatch,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::ResumeCreate,
        Feature::AtsAnalysis,
        Feature::Optimize,
        Feature::Generate,
        Feature::CandidateMatch,
    ];

    pub fn cost(self) -> i32 {
        match self {
            Feature::ResumeCreate => 1,
            Feature::AtsAnalysis => 1,
            Feature::Optimize => 2,
            Feature::Generate => 2,
            Feature::CandidateMatch => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::ResumeCreate => "resume_create",
            Feature::AtsAnalysis => "ats_analysis",
            Feature::Optimize => "optimize",
            Feature::Generate => "generate",
            Feature::CandidateMatch => "candidate_match",
        }
    }
}

/// Receipt for a successful charge; pass it back to `refund` if the work fails.
#[derive(Debug, Clone, Serialize)]
pub struct Charge {
    pub usage_id: Uuid,
    pub user_id: Uuid,
    pub feature: Feature,
    pub credits_used: i32,
    pub remaining_credits: i32,
}

/// Loads the user's subscription row, if any.
pub async fn get_subscription(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<SubscriptionRow>, AppError> {
    let sub = sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(sub)
}

/// Charges `feature` to the user, or records free usage for active subscribers.
pub async fn charge(
    pool: &PgPool,
    user_id: Uuid,
    feature: Feature,
    resume_id: Option<Uuid>,
) -> Result<Charge, AppError> {
    let covered = get_subscription(pool, user_id)
        .await?
        .is_some_and(|s| s.covers_paid_features(Utc::now()));
    let cost = if covered { 0 } else { feature.cost() };

    let mut tx = pool.begin().await?;

    let remaining: Option<i32> = sqlx::query_scalar(
        r#"
        UPDATE users
        SET credits = credits - $2, updated_at = now()
        WHERE id = $1 AND credits >= $2
        RETURNING credits
        "#,
    )
    .bind(user_id)
    .bind(cost)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(remaining_credits) = remaining else {
        let available: i32 = sqlx::query_scalar("SELECT credits FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or(0);
        return Err(AppError::InsufficientCredits {
            required: cost,
            available,
        });
    };

    let usage_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO credit_usage (user_id, feature, credits_used, resume_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(feature.as_str())
    .bind(cost)
    .bind(resume_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Charged {cost} credit(s) for {} to user {user_id} ({remaining_credits} left)",
        feature.as_str()
    );

    Ok(Charge {
        usage_id,
        user_id,
        feature,
        credits_used: cost,
        remaining_credits,
    })
}

/// Reverses a charge after the charged work failed.
pub async fn refund(pool: &PgPool, charge: &Charge) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM credit_usage WHERE id = $1 AND user_id = $2")
        .bind(charge.usage_id)
        .bind(charge.user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // Only return credits for a usage row we actually removed, so a repeated
    // refund of the same charge is a no-op.
    if deleted == 1 && charge.credits_used > 0 {
        sqlx::query("UPDATE users SET credits = credits + $2, updated_at = now() WHERE id = $1")
            .bind(charge.user_id)
            .bind(charge.credits_used)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!(
        "Refunded {} credit(s) for {} to user {}",
        charge.credits_used,
        charge.feature.as_str(),
        charge.user_id
    );
    Ok(())
}

/// Refund used on error paths: a failed refund is logged, and the caller keeps
/// reporting the error that triggered it.
pub async fn refund_after_failure(pool: &PgPool, charge: &Charge) {
    if let Err(e) = refund(pool, charge).await {
        warn!(
            "Refund of {} for user {} failed: {e}",
            charge.feature.as_str(),
            charge.user_id
        );
    }
}

/// Passes `result` through, refunding `charge` first when it is an error.
/// For work that runs after a successful charge.
pub async fn refund_if_failed<T>(
    pool: &PgPool,
    charge: &Charge,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if result.is_err() {
        refund_after_failure(pool, charge).await;
    }
    result
}

/// Links a usage row to the resume it produced, once that resume exists.
pub async fn attach_resume(pool: &PgPool, charge: &Charge, resume_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE credit_usage SET resume_id = $2 WHERE id = $1")
        .bind(charge.usage_id)
        .bind(resume_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn usage_history(pool: &PgPool, user_id: Uuid) -> Result<Vec<CreditUsageRow>, AppError> {
    let rows = sqlx::query_as::<_, CreditUsageRow>(
        "SELECT * FROM credit_usage WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs_are_positive() {
        for feature in Feature::ALL {
            assert!(feature.cost() > 0, "{feature:?}");
        }
    }

    #[test]
    fn test_feature_names_match_serde() {
        for feature in Feature::ALL {
            let json = serde_json::to_value(feature).unwrap();
            assert_eq!(json, serde_json::Value::String(feature.as_str().to_string()));
        }
    }

    #[test]
    fn test_llm_rewrites_cost_more_than_analysis() {
        assert!(Feature::Optimize.cost() > Feature::AtsAnalysis.cost());
        assert!(Feature::Generate.cost() > Feature::ResumeCreate.cost());
    }

    use crate::state::test_support::{credits_of, database, insert_user};

    async fn usage_rows(pool: &PgPool, user_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM credit_usage WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_charge_then_refund_restores_credits() {
        let Some(pool) = database().await else { return };
        let user_id = insert_user(&pool, 5).await;

        let charge = charge(&pool, user_id, Feature::Optimize, None).await.unwrap();
        assert_eq!(charge.remaining_credits, 3);
        assert_eq!(credits_of(&pool, user_id).await, 3);
        assert_eq!(usage_rows(&pool, user_id).await, 1);

        refund(&pool, &charge).await.unwrap();
        refund(&pool, &charge).await.unwrap();
        assert_eq!(credits_of(&pool, user_id).await, 5);
        assert_eq!(usage_rows(&pool, user_id).await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_credits_changes_nothing() {
        let Some(pool) = database().await else { return };
        let user_id = insert_user(&pool, 1).await;

        let err = charge(&pool, user_id, Feature::Generate, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientCredits { required: 2, available: 1 }
        ));
        assert_eq!(credits_of(&pool, user_id).await, 1);
        assert_eq!(usage_rows(&pool, user_id).await, 0);
    }

    #[tokio::test]
    async fn test_failed_usage_insert_keeps_credits() {
        let Some(pool) = database().await else { return };
        let user_id = insert_user(&pool, 4).await;
        let name = format!("reject_usage_{}", user_id.simple());

        sqlx::query(&format!(
            r#"CREATE FUNCTION {name}() RETURNS trigger AS $$
            BEGIN
                IF NEW.user_id = '{user_id}' THEN RAISE EXCEPTION 'usage rejected'; END IF;
                RETURN NEW;
            END $$ LANGUAGE plpgsql"#
        ))
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(&format!(
            "CREATE TRIGGER {name} BEFORE INSERT ON credit_usage FOR EACH ROW EXECUTE FUNCTION {name}()"
        ))
        .execute(&pool)
        .await
        .unwrap();

        let result = charge(&pool, user_id, Feature::AtsAnalysis, None).await;

        sqlx::query(&format!("DROP TRIGGER {name} ON credit_usage"))
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(&format!("DROP FUNCTION {name}()"))
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(credits_of(&pool, user_id).await, 4);
    }

    #[tokio::test]
    async fn test_refund_if_failed_only_refunds_errors() {
        let Some(pool) = database().await else { return };
        let user_id = insert_user(&pool, 3).await;

        let kept = charge(&pool, user_id, Feature::AtsAnalysis, None).await.unwrap();
        let ok: Result<u8, AppError> = Ok(7);
        assert_eq!(refund_if_failed(&pool, &kept, ok).await.unwrap(), 7);
        assert_eq!(credits_of(&pool, user_id).await, 2);

        let lost = charge(&pool, user_id, Feature::AtsAnalysis, None).await.unwrap();
        let failed: Result<(), AppError> = Err(AppError::Storage("write failed".into()));
        assert!(matches!(
            refund_if_failed(&pool, &lost, failed).await,
            Err(AppError::Storage(_))
        ));
        assert_eq!(credits_of(&pool, user_id).await, 2);
        assert_eq!(usage_rows(&pool, user_id).await, 1);
    }
}
