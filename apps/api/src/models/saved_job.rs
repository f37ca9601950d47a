use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedJobRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    pub apply_url: Option<String>,
    pub source: Option<String>,
    pub applied_status: bool,
    pub applied_at: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobViewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub apply_url: Option<String>,
    pub viewed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
