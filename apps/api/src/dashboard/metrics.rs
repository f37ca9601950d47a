use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::profile::JobPreferencesRow;
use crate::subscription::allowance::SearchAllowance;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActivityCounts {
    pub searches: i64,
    pub views: i64,
    pub saved: i64,
    pub applied: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_searches: u64,
    pub viewed_jobs: u64,
    pub saved_jobs: u64,
    pub applied_jobs: u64,
    pub profile_complete: bool,
    pub allowance: SearchAllowance,
}

/// A profile is complete once the user has told us what or where to search.
pub fn is_profile_complete(preferences: Option<&JobPreferencesRow>) -> bool {
    preferences.is_some_and(|p| !p.job_titles.is_empty() || !p.locations.is_empty())
}

pub fn build_metrics(
    counts: &ActivityCounts,
    preferences: Option<&JobPreferencesRow>,
    allowance: SearchAllowance,
) -> DashboardMetrics {
    DashboardMetrics {
        total_searches: non_negative(counts.searches),
        viewed_jobs: non_negative(counts.views),
        saved_jobs: non_negative(counts.saved),
        applied_jobs: non_negative(counts.applied),
        profile_complete: is_profile_complete(preferences),
        allowance,
    }
}

fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

pub async fn load_activity_counts(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<ActivityCounts, sqlx::Error> {
    sqlx::query_as::<_, ActivityCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM job_searches WHERE user_id = $1) AS searches,
            (SELECT COUNT(*) FROM job_views WHERE user_id = $1) AS views,
            (SELECT COUNT(*) FROM saved_jobs WHERE user_id = $1) AS saved,
            (SELECT COUNT(*) FROM saved_jobs WHERE user_id = $1 AND applied_status) AS applied
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
