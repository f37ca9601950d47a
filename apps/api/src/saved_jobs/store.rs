use sqlx::PgPool;
use uuid::Uuid;

use crate::models::saved_job::{JobViewRow, SavedJobRow};
use crate::saved_jobs::entry::{JobViewInput, NewSavedJob};

/// The same posting saved earlier by this user, if any.
pub async fn find_existing(
    pool: &PgPool,
    user_id: Uuid,
    job: &NewSavedJob,
) -> Result<Option<SavedJobRow>, sqlx::Error> {
    sqlx::query_as::<_, SavedJobRow>(
        r#"
        SELECT * FROM saved_jobs
        WHERE user_id = $1 AND job_title = $2 AND company = $3
          AND COALESCE(apply_url, '') = COALESCE($4, '')
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(&job.job_title)
    .bind(&job.company)
    .bind(&job.apply_url)
    .fetch_optional(pool)
    .await
}

/// Inserts the posting unless this user already saved it. `None` on conflict with
/// `idx_saved_jobs_posting`.
pub async fn insert_new(
    pool: &PgPool,
    user_id: Uuid,
    job: &NewSavedJob,
) -> Result<Option<SavedJobRow>, sqlx::Error> {
    sqlx::query_as::<_, SavedJobRow>(
        r#"
        INSERT INTO saved_jobs
            (user_id, job_title, company, location, salary, description, apply_url, source)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, job_title, company, (COALESCE(apply_url, ''))) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&job.job_title)
    .bind(&job.company)
    .bind(&job.location)
    .bind(&job.salary)
    .bind(&job.description)
    .bind(&job.apply_url)
    .bind(&job.source)
    .fetch_optional(pool)
    .await
}

/// Newest first.
pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<SavedJobRow>, sqlx::Error> {
    sqlx::query_as::<_, SavedJobRow>(
        "SELECT * FROM saved_jobs WHERE user_id = $1 ORDER BY saved_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// `None` when the job does not exist or belongs to someone else.
pub async fn mark_applied(
    pool: &PgPool,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<Option<SavedJobRow>, sqlx::Error> {
    sqlx::query_as::<_, SavedJobRow>(
        r#"
        UPDATE saved_jobs
        SET applied_status = TRUE,
            applied_at = COALESCE(applied_at, NOW()),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Returns whether a row was deleted.
pub async fn delete(pool: &PgPool, user_id: Uuid, job_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM saved_jobs WHERE id = $1 AND user_id = $2")
        .bind(job_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn record_view(pool: &PgPool, view: &JobViewInput) -> Result<JobViewRow, sqlx::Error> {
    sqlx::query_as::<_, JobViewRow>(
        r#"
        INSERT INTO job_views (user_id, job_title, company, apply_url)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(view.user_id)
    .bind(view.job_title.trim())
    .bind(view.company.trim())
    .bind(&view.apply_url)
    .fetch_one(pool)
    .await
}
