//! Axum route handler for the job search endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use tracing::error;

use crate::errors::{AppError, SearchFailure};
use crate::search::models::{SearchRequest, SearchResponse};
use crate::search::service::search_jobs;
use crate::state::AppState;

/// POST /api/v1/jobs/search
///
/// Success: `{ "jobs": [...] }`. Any failure, including an unreadable body:
/// `{ "error": "...", "jobs": [] }` with a non-2xx status.
///
/// With a `userId` one search is reserved from the user's allowance before the
/// provider is called, and handed back if the search fails. Failing to record a
/// finished search is logged, not returned.
pub async fn handle_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, SearchFailure> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let reservation = match request.user_id {
        Some(user_id) => Some(state.meter.reserve(user_id, Utc::now().date_naive()).await?),
        None => None,
    };

    let result = search_jobs(
        state.search.as_ref(),
        &request,
        state.config.search_max_results,
    )
    .await;

    let jobs = match result {
        Ok(jobs) => jobs,
        Err(e) => {
            if let Some(reservation) = reservation {
                if let Err(release_err) = state.meter.release(reservation).await {
                    error!(
                        "Failed to release search for user {}: {release_err}",
                        reservation.user_id
                    );
                }
            }
            return Err(e.into());
        }
    };

    if let Some(reservation) = reservation {
        if let Err(e) = state.meter.record(reservation, &request, jobs.len()).await {
            error!("Failed to record search for user {}: {e}", reservation.user_id);
        }
    }

    Ok(Json(SearchResponse { jobs }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use chrono::NaiveDate;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::routes::{build_router, cors_layer};
    use crate::search::provider::JobSearchProvider;
    use crate::subscription::allowance::{SearchAllowance, SubscriptionTier};
    use crate::subscription::metering::{quota_message, SearchMeter, SearchReservation};

    use super::*;

    /// Fixed completion, or a 503 upstream error when `None`. Counts its calls.
    #[derive(Default)]
    struct FixedProvider {
        completion: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn answering(completion: &'static str) -> Arc<Self> {
            Arc::new(Self {
                completion: Some(completion),
                ..Default::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self::default())
        }
    }

    #[async_trait]
    impl JobSearchProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_completion(&self, _system: &str, _query: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.completion
                .map(str::to_string)
                .ok_or_else(|| AppError::Llm("Perplexity API error: 503".into()))
        }
    }

    /// Free-tier allowance held in memory.
    struct MemoryMeter {
        max: u32,
        used: Mutex<u32>,
        recorded: Mutex<Vec<usize>>,
    }

    impl MemoryMeter {
        fn with_used(max: u32, used: u32) -> Arc<Self> {
            Arc::new(Self {
                max,
                used: Mutex::new(used),
                recorded: Mutex::new(Vec::new()),
            })
        }

        fn used(&self) -> u32 {
            *self.used.lock().unwrap()
        }

        fn recorded(&self) -> Vec<usize> {
            self.recorded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchMeter for MemoryMeter {
        async fn reserve(
            &self,
            user_id: Uuid,
            today: NaiveDate,
        ) -> Result<SearchReservation, AppError> {
            let mut used = self.used.lock().unwrap();
            if *used >= self.max {
                return Err(AppError::QuotaExceeded(quota_message(&SearchAllowance {
                    tier: SubscriptionTier::Free,
                    searches_used: *used,
                    max_searches: Some(self.max),
                    remaining: Some(0),
                    period_start: today,
                })));
            }
            *used += 1;
            Ok(SearchReservation {
                user_id,
                period_start: today,
                counted: true,
            })
        }

        async fn release(&self, _reservation: SearchReservation) -> Result<(), AppError> {
            let mut used = self.used.lock().unwrap();
            *used = used.saturating_sub(1);
            Ok(())
        }

        async fn record(
            &self,
            _reservation: SearchReservation,
            _request: &SearchRequest,
            results_count: usize,
        ) -> Result<(), AppError> {
            self.recorded.lock().unwrap().push(results_count);
            Ok(())
        }
    }

    fn test_app(provider: Arc<FixedProvider>) -> Router {
        test_app_with_meter(provider, MemoryMeter::with_used(2, 0))
    }

    fn test_app_with_meter(provider: Arc<FixedProvider>, meter: Arc<MemoryMeter>) -> Router {
        let config = Config {
            database_url: "postgres://localhost/jobfinder_test".into(),
            perplexity_api_key: None,
            perplexity_api_url: "http://127.0.0.1:9/unused".into(),
            perplexity_model: "sonar".into(),
            search_max_results: 8,
            port: 0,
            rust_log: "info".into(),
        };
        // Never connects: searches reach storage only through the meter.
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        build_router(AppState {
            db,
            config,
            search: provider,
            meter,
        })
        .layer(cors_layer())
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/jobs/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_normalized_jobs() {
        let app = test_app(FixedProvider::answering(
            r#"[{"title":"Engineer","company":"Acme"}]"#,
        ));

        let response = app
            .oneshot(search_request(
                r#"{"jobTitles":["Engineer"],"locations":["Remote"],"yearsExperience":2}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let jobs = body["jobs"].as_array().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["title"], "Engineer");
        assert_eq!(
            jobs[0]["apply_url"],
            "https://www.google.com/search?q=Engineer%20Acme%20job"
        );
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_error_and_empty_jobs() {
        let app = test_app(FixedProvider::failing());

        let response = app.oneshot(search_request("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Perplexity API error: 503");
        assert_eq!(body["jobs"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_body_uses_search_error_shape() {
        let app = test_app(FixedProvider::answering("[]"));

        let response = app.oneshot(search_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert_eq!(body["jobs"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_preflight_allows_any_origin_with_empty_body() {
        let app = test_app(FixedProvider::answering("[]"));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/jobs/search")
            .header("origin", "https://app.example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "authorization, x-client-info, apikey, content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_fractional_years_and_null_lists_are_accepted() {
        let app = test_app(FixedProvider::answering(
            r#"[{"title":"Engineer","company":"Acme"}]"#,
        ));

        let response = app
            .oneshot(search_request(
                r#"{"jobTitles":null,"locations":null,"yearsExperience":2.5}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_allowance_returns_402_without_calling_provider() {
        let provider = FixedProvider::answering("[]");
        let meter = MemoryMeter::with_used(2, 2);
        let app = test_app_with_meter(provider.clone(), meter.clone());

        let body = format!(r#"{{"jobTitles":["Engineer"],"userId":"{}"}}"#, Uuid::new_v4());
        let response = app.oneshot(search_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|e| e.contains("includes 2 AI job searches")));
        assert_eq!(body["jobs"], serde_json::json!([]));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(meter.used(), 2);
        assert!(meter.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_failed_search_gives_the_search_back() {
        let provider = FixedProvider::failing();
        let meter = MemoryMeter::with_used(2, 1);
        let app = test_app_with_meter(provider.clone(), meter.clone());

        let body = format!(r#"{{"jobTitles":["Engineer"],"userId":"{}"}}"#, Uuid::new_v4());
        let response = app.oneshot(search_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(meter.used(), 1);
        assert!(meter.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_successful_search_is_counted_and_recorded() {
        let provider = FixedProvider::answering(r#"[{"title":"Engineer","company":"Acme"}]"#);
        let meter = MemoryMeter::with_used(2, 1);
        let app = test_app_with_meter(provider, meter.clone());

        let body = format!(r#"{{"jobTitles":["Engineer"],"userId":"{}"}}"#, Uuid::new_v4());
        let response = app.oneshot(search_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(meter.used(), 2);
        assert_eq!(meter.recorded(), vec![1]);
    }

    #[tokio::test]
    async fn test_concurrent_searches_cannot_overrun_allowance() {
        let provider = FixedProvider::answering("[]");
        let meter = MemoryMeter::with_used(2, 1);
        let app = test_app_with_meter(provider.clone(), meter.clone());
        let user_id = Uuid::new_v4();

        let requests = (0..3).map(|_| {
            let app = app.clone();
            let body = format!(r#"{{"jobTitles":["Engineer"],"userId":"{user_id}"}}"#);
            async move { app.oneshot(search_request(&body)).await.unwrap().status() }
        });
        let statuses: Vec<StatusCode> = join_statuses(requests).await;

        let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
        let refused = statuses
            .iter()
            .filter(|s| **s == StatusCode::PAYMENT_REQUIRED)
            .count();
        assert_eq!((ok, refused), (1, 2));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(meter.used(), 2);
    }

    async fn join_statuses<F>(futures: impl Iterator<Item = F>) -> Vec<StatusCode>
    where
        F: std::future::Future<Output = StatusCode> + Send + 'static,
    {
        let handles: Vec<_> = futures.map(tokio::spawn).collect();
        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap());
        }
        statuses
    }
}
