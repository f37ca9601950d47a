//! Gate and bookkeeping around a metered search.
//!
//! A search takes one unit of allowance before the provider is called and gives it
//! back if the search fails. `AppState` holds an `Arc<dyn SearchMeter>` so the
//! search handler never depends on the database directly.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::search::models::SearchRequest;
use crate::subscription::allowance::{current_period_start, evaluate, SearchAllowance};
use crate::subscription::store;

/// One unit of allowance held by an in-flight search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReservation {
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    /// False for premium users, whose searches are not counted.
    pub counted: bool,
}

#[async_trait]
pub trait SearchMeter: Send + Sync {
    /// Takes one search from the user's allowance, or fails with `QuotaExceeded`.
    async fn reserve(&self, user_id: Uuid, today: NaiveDate)
        -> Result<SearchReservation, AppError>;

    /// Returns a reservation whose search did not complete.
    async fn release(&self, reservation: SearchReservation) -> Result<(), AppError>;

    /// Logs a finished search to the user's history.
    async fn record(
        &self,
        reservation: SearchReservation,
        request: &SearchRequest,
        results_count: usize,
    ) -> Result<(), AppError>;
}

/// `user_search_limits` / `job_searches` backed meter.
pub struct PgSearchMeter {
    pool: PgPool,
}

impl PgSearchMeter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchMeter for PgSearchMeter {
    async fn reserve(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<SearchReservation, AppError> {
        let row = store::load_or_create(&self.pool, user_id).await?;
        let allowance = evaluate(&row, today);
        if allowance.is_exhausted() {
            info!("Search allowance exhausted for user {user_id}");
            return Err(AppError::QuotaExceeded(quota_message(&allowance)));
        }

        // The read above is only a shortcut; the conditional update decides.
        let period_start = current_period_start(today);
        match store::reserve_search(&self.pool, user_id, period_start).await? {
            Some(updated) => Ok(SearchReservation {
                user_id,
                period_start: updated.period_start,
                counted: !updated.subscription_active,
            }),
            None => {
                info!("Search allowance taken by a concurrent search for user {user_id}");
                Err(AppError::QuotaExceeded(quota_message(&allowance)))
            }
        }
    }

    async fn release(&self, reservation: SearchReservation) -> Result<(), AppError> {
        if reservation.counted {
            store::release_search(&self.pool, reservation.user_id, reservation.period_start)
                .await?;
        }
        Ok(())
    }

    async fn record(
        &self,
        reservation: SearchReservation,
        request: &SearchRequest,
        results_count: usize,
    ) -> Result<(), AppError> {
        store::record_search(
            &self.pool,
            reservation.user_id,
            &search_query_json(request),
            i32::try_from(results_count).unwrap_or(i32::MAX),
        )
        .await?;
        Ok(())
    }
}

pub fn quota_message(allowance: &SearchAllowance) -> String {
    format!(
        "The free plan includes {} AI job searches per month. Upgrade to premium for unlimited searches.",
        allowance.max_searches.unwrap_or_default()
    )
}

/// What gets stored in `job_searches.search_query`.
fn search_query_json(request: &SearchRequest) -> serde_json::Value {
    json!({
        "jobTitles": request.job_titles,
        "locations": request.locations,
        "yearsExperience": request.years_experience,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::allowance::SubscriptionTier;

    #[test]
    fn test_quota_message_names_the_limit() {
        let allowance = SearchAllowance {
            tier: SubscriptionTier::Free,
            searches_used: 2,
            max_searches: Some(2),
            remaining: Some(0),
            period_start: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        };
        assert!(quota_message(&allowance).contains("includes 2 AI job searches"));
    }

    #[test]
    fn test_search_query_json_omits_user_id() {
        let request = SearchRequest {
            job_titles: vec!["Designer".into()],
            locations: vec![],
            years_experience: 2.0,
            user_id: Some(Uuid::new_v4()),
        };
        let value = search_query_json(&request);
        assert_eq!(value["jobTitles"][0], "Designer");
        assert_eq!(value["yearsExperience"], 2.0);
        assert!(value.get("userId").is_none());
    }

    #[test]
    fn test_reservation_guard_is_part_of_the_update() {
        // The limit check must live in the UPDATE itself, not in a prior read.
        let sql = include_str!("store.rs");
        let reserve = &sql[sql.find("pub async fn reserve_search").unwrap()..];
        let reserve = &reserve[..reserve.find("pub async fn release_search").unwrap()];
        assert!(reserve.contains("UPDATE user_search_limits"));
        assert!(reserve.contains("searches_used < max_searches"));
        assert!(reserve.contains("fetch_optional"));
    }
}
