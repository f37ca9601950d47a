use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::saved_job::{JobViewRow, SavedJobRow};
use crate::models::UserIdQuery;
use crate::saved_jobs::entry::{JobViewInput, NewSavedJob};
use crate::saved_jobs::store;
use crate::search::models::JobListing;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveJobRequest {
    pub user_id: Uuid,
    pub job: JobListing,
}

#[derive(Debug, Deserialize)]
pub struct MarkAppliedRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/saved-jobs
///
/// Saving the same posting twice returns the existing row with 200.
pub async fn handle_save_job(
    State(state): State<AppState>,
    Json(req): Json<SaveJobRequest>,
) -> Result<(StatusCode, Json<SavedJobRow>), AppError> {
    let job = NewSavedJob::from_listing(&req.job)?;

    if let Some(row) = store::insert_new(&state.db, req.user_id, &job).await? {
        info!("User {} saved job {} ({})", req.user_id, row.id, row.job_title);
        return Ok((StatusCode::CREATED, Json(row)));
    }

    let existing = store::find_existing(&state.db, req.user_id, &job)
        .await?
        .ok_or_else(|| {
            anyhow!(
                "saved job '{}' at {} conflicted but could not be re-read",
                job.job_title,
                job.company
            )
        })?;
    Ok((StatusCode::OK, Json(existing)))
}

/// GET /api/v1/saved-jobs
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<SavedJobRow>>, AppError> {
    let jobs = store::list(&state.db, params.user_id).await?;
    Ok(Json(jobs))
}

/// POST /api/v1/saved-jobs/:id/applied
pub async fn handle_mark_applied(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkAppliedRequest>,
) -> Result<Json<SavedJobRow>, AppError> {
    let row = store::mark_applied(&state.db, req.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Saved job {id} not found")))?;
    Ok(Json(row))
}

/// DELETE /api/v1/saved-jobs/:id
pub async fn handle_delete_saved_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !store::delete(&state.db, params.user_id, id).await? {
        return Err(AppError::NotFound(format!("Saved job {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/job-views
///
/// Recorded when the user follows a listing's apply link.
pub async fn handle_record_view(
    State(state): State<AppState>,
    Json(req): Json<JobViewInput>,
) -> Result<(StatusCode, Json<JobViewRow>), AppError> {
    let view = req.validate()?;
    let row = store::record_view(&state.db, &view).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
