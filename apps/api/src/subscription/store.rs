use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::search_limits::SearchLimitsRow;
use crate::subscription::allowance::{SubscriptionTier, FREE_MONTHLY_SEARCHES};

const SEARCH_TYPE: &str = "enhanced";

/// Returns the user's limits row, creating a free-tier row on first use.
pub async fn load_or_create(pool: &PgPool, user_id: Uuid) -> Result<SearchLimitsRow, sqlx::Error> {
    sqlx::query_as::<_, SearchLimitsRow>(
        r#"
        INSERT INTO user_search_limits (user_id, max_searches)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(FREE_MONTHLY_SEARCHES)
    .fetch_one(pool)
    .await
}

/// Takes one search from the allowance in a single statement, starting a new period
/// when the stored one is older than `period_start`. Premium rows pass through
/// unchanged. `None` when a free row has no searches left.
///
/// Concurrent callers serialize on the row lock, and the `WHERE` guard is
/// re-checked against the updated row, so the limit cannot be overrun.
pub async fn reserve_search(
    pool: &PgPool,
    user_id: Uuid,
    period_start: NaiveDate,
) -> Result<Option<SearchLimitsRow>, sqlx::Error> {
    sqlx::query_as::<_, SearchLimitsRow>(
        r#"
        UPDATE user_search_limits
        SET searches_used = CASE
                WHEN subscription_active THEN searches_used
                WHEN period_start < $2 THEN 1
                ELSE searches_used + 1
            END,
            period_start = CASE
                WHEN subscription_active THEN period_start
                ELSE GREATEST(period_start, $2)
            END,
            updated_at = NOW()
        WHERE user_id = $1
          AND (subscription_active OR period_start < $2 OR searches_used < max_searches)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(period_start)
    .fetch_optional(pool)
    .await
}

/// Gives back a search taken by `reserve_search` in the same period.
pub async fn release_search(
    pool: &PgPool,
    user_id: Uuid,
    period_start: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE user_search_limits
        SET searches_used = GREATEST(searches_used - 1, 0),
            updated_at = NOW()
        WHERE user_id = $1 AND period_start = $2 AND NOT subscription_active
        "#,
    )
    .bind(user_id)
    .bind(period_start)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn record_search(
    pool: &PgPool,
    user_id: Uuid,
    search_query: &Value,
    results_count: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO job_searches (user_id, search_query, search_type, results_count)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(search_query)
    .bind(SEARCH_TYPE)
    .bind(results_count)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn activate(
    pool: &PgPool,
    user_id: Uuid,
    tier: SubscriptionTier,
) -> Result<SearchLimitsRow, sqlx::Error> {
    sqlx::query_as::<_, SearchLimitsRow>(
        r#"
        INSERT INTO user_search_limits (user_id, max_searches, subscription_active, subscription_type)
        VALUES ($1, $2, TRUE, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET subscription_active = TRUE,
            subscription_type = EXCLUDED.subscription_type,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(FREE_MONTHLY_SEARCHES)
    .bind(tier.as_str())
    .fetch_one(pool)
    .await
}
