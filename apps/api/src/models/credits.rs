use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditUsageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feature: String,
    pub credits_used: i32,
    pub resume_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    /// An active `pro` plan whose period has not lapsed.
    pub fn covers_paid_features(&self, now: DateTime<Utc>) -> bool {
        self.plan == "pro"
            && self.status == "active"
            && self.current_period_end.is_some_and(|end| end > now)
    }
}
