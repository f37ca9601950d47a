pub mod health;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName,
    },
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::dashboard::handlers as dashboard;
use crate::profile::handlers as profile;
use crate::saved_jobs::handlers as saved_jobs;
use crate::search::handlers as search;
use crate::state::AppState;
use crate::subscription::handlers as subscription;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Search
        .route("/api/v1/jobs/search", post(search::handle_search))
        // Profile & preferences
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_put_profile),
        )
        .route(
            "/api/v1/preferences",
            get(profile::handle_get_preferences).put(profile::handle_put_preferences),
        )
        // Saved jobs & views
        .route(
            "/api/v1/saved-jobs",
            get(saved_jobs::handle_list_saved_jobs).post(saved_jobs::handle_save_job),
        )
        .route(
            "/api/v1/saved-jobs/:id",
            delete(saved_jobs::handle_delete_saved_job),
        )
        .route(
            "/api/v1/saved-jobs/:id/applied",
            post(saved_jobs::handle_mark_applied),
        )
        .route("/api/v1/job-views", post(saved_jobs::handle_record_view))
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        // Subscription
        .route(
            "/api/v1/subscription",
            get(subscription::handle_get_allowance),
        )
        .route(
            "/api/v1/subscription/activate",
            post(subscription::handle_activate),
        )
        .with_state(state)
}

/// Any origin, any method, and the headers the web client sends.
/// Preflight requests are answered with an empty 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
