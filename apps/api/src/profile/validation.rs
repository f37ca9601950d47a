use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInput {
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesInput {
    pub user_id: Uuid,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub employment_types: Vec<String>,
    #[serde(default)]
    pub salary_min: i32,
    #[serde(default)]
    pub salary_max: i32,
    #[serde(default)]
    pub remote_preference: bool,
}

/// Trims entries, drops blanks, and removes case-insensitive duplicates
/// keeping the first spelling.
pub fn normalize_entries(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Cleans list fields, then checks:
/// - at least one job title or location (searching needs something to go on)
/// - years of experience and salary bounds are non-negative
/// - salary_min <= salary_max when both are set
pub fn validate_preferences(input: PreferencesInput) -> Result<PreferencesInput, AppError> {
    let mut cleaned = input;
    cleaned.job_titles = normalize_entries(&cleaned.job_titles);
    cleaned.locations = normalize_entries(&cleaned.locations);
    cleaned.skills = normalize_entries(&cleaned.skills);
    cleaned.industries = normalize_entries(&cleaned.industries);
    cleaned.employment_types = normalize_entries(&cleaned.employment_types);

    if cleaned.job_titles.is_empty() && cleaned.locations.is_empty() {
        return Err(AppError::Validation(
            "Add at least one job title or location".to_string(),
        ));
    }
    if cleaned.years_experience < 0 {
        return Err(AppError::Validation(
            "years_experience cannot be negative".to_string(),
        ));
    }
    if cleaned.salary_min < 0 || cleaned.salary_max < 0 {
        return Err(AppError::Validation(
            "salary bounds cannot be negative".to_string(),
        ));
    }
    if cleaned.salary_min > 0 && cleaned.salary_max > 0 && cleaned.salary_min > cleaned.salary_max {
        return Err(AppError::Validation(
            "salary_min cannot exceed salary_max".to_string(),
        ));
    }

    Ok(cleaned)
}

/// Blank name/email become `None`; a present email must look like one.
pub fn validate_profile(input: ProfileInput) -> Result<ProfileInput, AppError> {
    let name = non_blank(input.name);
    let email = non_blank(input.email);

    if let Some(email) = &email {
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::Validation(format!("'{email}' is not a valid email")));
        }
    }

    Ok(ProfileInput {
        user_id: input.user_id,
        name,
        email,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
