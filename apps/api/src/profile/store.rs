use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::{JobPreferencesRow, ProfileRow};
use crate::profile::validation::{PreferencesInput, ProfileInput};

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn upsert_profile(pool: &PgPool, input: &ProfileInput) -> Result<ProfileRow, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (id, name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE
        SET name = EXCLUDED.name,
            email = EXCLUDED.email,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(input.user_id)
    .bind(&input.name)
    .bind(&input.email)
    .fetch_one(pool)
    .await
}

pub async fn get_preferences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<JobPreferencesRow>, sqlx::Error> {
    sqlx::query_as::<_, JobPreferencesRow>("SELECT * FROM job_preferences WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// One preferences row per user; saving replaces every field.
pub async fn upsert_preferences(
    pool: &PgPool,
    input: &PreferencesInput,
) -> Result<JobPreferencesRow, sqlx::Error> {
    sqlx::query_as::<_, JobPreferencesRow>(
        r#"
        INSERT INTO job_preferences
            (user_id, job_titles, locations, years_experience, skills, industries,
             employment_types, salary_min, salary_max, remote_preference)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id) DO UPDATE
        SET job_titles = EXCLUDED.job_titles,
            locations = EXCLUDED.locations,
            years_experience = EXCLUDED.years_experience,
            skills = EXCLUDED.skills,
            industries = EXCLUDED.industries,
            employment_types = EXCLUDED.employment_types,
            salary_min = EXCLUDED.salary_min,
            salary_max = EXCLUDED.salary_max,
            remote_preference = EXCLUDED.remote_preference,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(input.user_id)
    .bind(&input.job_titles)
    .bind(&input.locations)
    .bind(input.years_experience)
    .bind(&input.skills)
    .bind(&input.industries)
    .bind(&input.employment_types)
    .bind(input.salary_min)
    .bind(input.salary_max)
    .bind(input.remote_preference)
    .fetch_one(pool)
    .await
}
