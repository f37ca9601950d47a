use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::UserIdQuery;
use crate::state::AppState;
use crate::subscription::allowance::{evaluate, SearchAllowance, SubscriptionTier};
use crate::subscription::store;

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub user_id: Uuid,
    /// Defaults to premium, the only paid tier.
    #[serde(default)]
    pub subscription_type: Option<SubscriptionTier>,
}

/// GET /api/v1/subscription
pub async fn handle_get_allowance(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SearchAllowance>, AppError> {
    let row = store::load_or_create(&state.db, params.user_id).await?;
    Ok(Json(evaluate(&row, Utc::now().date_naive())))
}

/// POST /api/v1/subscription/activate
///
/// Called after checkout completes at the payment provider.
pub async fn handle_activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<SearchAllowance>, AppError> {
    let tier = req.subscription_type.unwrap_or(SubscriptionTier::Premium);
    if tier == SubscriptionTier::Free {
        return Err(AppError::Validation(
            "subscription_type must be a paid tier".to_string(),
        ));
    }

    let row = store::activate(&state.db, req.user_id, tier).await?;
    info!("Activated {} subscription for user {}", tier.as_str(), req.user_id);

    Ok(Json(evaluate(&row, Utc::now().date_naive())))
}
