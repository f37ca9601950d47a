use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchLimitsRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub max_searches: i32,
    pub searches_used: i32,
    pub subscription_active: bool,
    pub subscription_type: String,
    /// First day of the month `searches_used` counts against.
    pub period_start: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
