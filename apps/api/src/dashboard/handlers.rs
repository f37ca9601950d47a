use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::dashboard::metrics::{build_metrics, load_activity_counts, DashboardMetrics};
use crate::errors::AppError;
use crate::models::UserIdQuery;
use crate::profile::store::get_preferences;
use crate::state::AppState;
use crate::subscription::allowance::evaluate;
use crate::subscription::store::load_or_create;

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardMetrics>, AppError> {
    let counts = load_activity_counts(&state.db, params.user_id).await?;
    let preferences = get_preferences(&state.db, params.user_id).await?;
    let limits = load_or_create(&state.db, params.user_id).await?;
    let allowance = evaluate(&limits, Utc::now().date_naive());

    Ok(Json(build_metrics(
        &counts,
        preferences.as_ref(),
        allowance,
    )))
}
