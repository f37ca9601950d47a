use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account profile. `id` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPreferencesRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_titles: Vec<String>,
    pub locations: Vec<String>,
    pub years_experience: i32,
    pub skills: Vec<String>,
    pub industries: Vec<String>,
    pub employment_types: Vec<String>,
    pub salary_min: i32,
    pub salary_max: i32,
    pub remote_preference: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
