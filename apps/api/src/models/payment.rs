use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_CREATED: &str = "created";
pub const STATUS_PAID: &str = "paid";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub pack_id: String,
    /// Smallest currency unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub credits_to_add: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
