use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{JobPreferencesRow, ProfileRow};
use crate::models::UserIdQuery;
use crate::profile::store;
use crate::profile::validation::{
    validate_preferences, validate_profile, PreferencesInput, ProfileInput,
};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = store::get_profile(&state.db, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", params.user_id)))?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileInput>,
) -> Result<Json<ProfileRow>, AppError> {
    let input = validate_profile(req)?;
    let profile = store::upsert_profile(&state.db, &input).await?;
    Ok(Json(profile))
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobPreferencesRow>, AppError> {
    let preferences = store::get_preferences(&state.db, params.user_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No job preferences saved for {}", params.user_id))
        })?;
    Ok(Json(preferences))
}

/// PUT /api/v1/preferences
pub async fn handle_put_preferences(
    State(state): State<AppState>,
    Json(req): Json<PreferencesInput>,
) -> Result<Json<JobPreferencesRow>, AppError> {
    let input = validate_preferences(req)?;
    let preferences = store::upsert_preferences(&state.db, &input).await?;
    info!(
        "Saved job preferences for user {}: {} titles, {} locations",
        input.user_id,
        input.job_titles.len(),
        input.locations.len()
    );
    Ok(Json(preferences))
}
