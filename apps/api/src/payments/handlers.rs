use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::credits::ledger::get_subscription;
use crate::errors::AppError;
use crate::models::credits::SubscriptionRow;
use crate::models::payment::{PaymentRow, STATUS_CREATED, STATUS_PAID};
use crate::payments::packs::{find_pack, Grant, Pack, PACKS};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub pack_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub pack: Pack,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: String,
    /// True when this order had already been confirmed; nothing was granted again.
    pub already_processed: bool,
    pub credits_added: i32,
    pub credits: i32,
    pub subscription: Option<SubscriptionRow>,
}

/// GET /api/v1/payments/packs
pub async fn handle_list_packs() -> Json<Vec<Pack>> {
    Json(PACKS.to_vec())
}

/// POST /api/v1/payments/orders
pub async fn handle_create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let pack = find_pack(req.pack_id.trim())
        .ok_or_else(|| AppError::Validation(format!("Unknown pack '{}'", req.pack_id)))?;

    let receipt = Uuid::new_v4().simple().to_string();
    let order = state
        .gateway
        .create_order(
            pack.amount,
            pack.currency,
            &receipt,
            json!({ "user_id": user.id, "pack_id": pack.id }),
        )
        .await?;

    sqlx::query(
        r#"
        INSERT INTO payments
            (user_id, gateway_order_id, pack_id, amount, currency, status, credits_to_add)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(user.id)
    .bind(&order.id)
    .bind(pack.id)
    .bind(pack.amount)
    .bind(pack.currency)
    .bind(STATUS_CREATED)
    .bind(pack.credits_to_add())
    .execute(&state.db)
    .await?;

    info!("Created order {} for pack {} (user {})", order.id, pack.id, user.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order.id,
            amount: pack.amount,
            currency: pack.currency.to_string(),
            key_id: state.gateway.key_id().to_string(),
            pack: *pack,
        }),
    ))
}

/// POST /api/v1/payments/verify
pub async fn handle_verify_payment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let payment = sqlx::query_as::<_, PaymentRow>(
        "SELECT * FROM payments WHERE gateway_order_id = $1 AND user_id = $2",
    )
    .bind(&req.order_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", req.order_id)))?;

    if payment.status == STATUS_PAID {
        return Ok(Json(settled(&state.db, user.id, true, 0).await?));
    }

    if !state
        .gateway
        .verify_signature(&req.order_id, &req.payment_id, &req.signature)
    {
        warn!(
            "Rejected payment signature for order {} (user {})",
            req.order_id, user.id
        );
        return Err(AppError::PaymentVerification);
    }

    let granted = complete_payment(&state.db, &payment, &req.payment_id).await?;
    let response = match granted {
        Some(credits_added) => settled(&state.db, user.id, false, credits_added).await?,
        // Another request confirmed it between our read and the update.
        None => settled(&state.db, user.id, true, 0).await?,
    };
    Ok(Json(response))
}

/// GET /api/v1/payments
pub async fn handle_list_payments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<PaymentRow>>, AppError> {
    let rows = sqlx::query_as::<_, PaymentRow>(
        "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// Marks the payment paid and applies its grant in one transaction.
/// Returns `None` when the payment was no longer `created`.
async fn complete_payment(
    pool: &PgPool,
    payment: &PaymentRow,
    gateway_payment_id: &str,
) -> Result<Option<i32>, AppError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE payments
        SET status = $3, gateway_payment_id = $2, updated_at = now()
        WHERE id = $1 AND status = $4
        "#,
    )
    .bind(payment.id)
    .bind(gateway_payment_id)
    .bind(STATUS_PAID)
    .bind(STATUS_CREATED)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    if payment.credits_to_add > 0 {
        sqlx::query("UPDATE users SET credits = credits + $2, updated_at = now() WHERE id = $1")
            .bind(payment.user_id)
            .bind(payment.credits_to_add)
            .execute(&mut *tx)
            .await?;
    }

    if let Some(Grant::Subscription { plan, days }) = find_pack(&payment.pack_id).map(|p| p.grant) {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, plan, status, current_period_end)
            VALUES ($1, $2, 'active', now() + make_interval(days => $3))
            ON CONFLICT (user_id) DO UPDATE
            SET plan = EXCLUDED.plan,
                status = 'active',
                current_period_end =
                    GREATEST(now(), COALESCE(subscriptions.current_period_end, now()))
                    + make_interval(days => $3),
                updated_at = now()
            "#,
        )
        .bind(payment.user_id)
        .bind(plan)
        .bind(days)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        "Payment {} confirmed: pack {}, {} credit(s) for user {}",
        payment.gateway_order_id, payment.pack_id, payment.credits_to_add, payment.user_id
    );
    Ok(Some(payment.credits_to_add))
}

async fn settled(
    pool: &PgPool,
    user_id: Uuid,
    already_processed: bool,
    credits_added: i32,
) -> Result<VerifyPaymentResponse, AppError> {
    let credits: i32 = sqlx::query_scalar("SELECT credits FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(VerifyPaymentResponse {
        status: STATUS_PAID.to_string(),
        already_processed,
        credits_added,
        credits,
        subscription: get_subscription(pool, user_id).await?,
    })
}
