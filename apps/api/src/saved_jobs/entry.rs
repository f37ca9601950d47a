use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::search::models::JobListing;
use crate::search::normalizer::is_valid_apply_url;

/// Column values for a new `saved_jobs` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavedJob {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub salary: Option<String>,
    pub description: String,
    pub apply_url: Option<String>,
    pub source: Option<String>,
}

impl NewSavedJob {
    /// Title and company identify a posting and are required. Blank optional
    /// fields and unusable apply links are stored as NULL.
    pub fn from_listing(listing: &JobListing) -> Result<Self, AppError> {
        let job_title = listing.title.trim();
        let company = listing.company.trim();
        if job_title.is_empty() || company.is_empty() {
            return Err(AppError::Validation(
                "A saved job needs a title and a company".to_string(),
            ));
        }

        Ok(NewSavedJob {
            job_title: job_title.to_string(),
            company: company.to_string(),
            location: listing.location.trim().to_string(),
            salary: optional(&listing.salary),
            description: listing.description.trim().to_string(),
            apply_url: optional(&listing.apply_url).filter(|url| is_valid_apply_url(url)),
            source: optional(&listing.source),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobViewInput {
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub apply_url: Option<String>,
}

impl JobViewInput {
    pub fn validate(self) -> Result<Self, AppError> {
        if self.job_title.trim().is_empty() || self.company.trim().is_empty() {
            return Err(AppError::Validation(
                "job_title and company are required".to_string(),
            ));
        }
        let apply_url = self.apply_url.as_deref().and_then(optional);
        Ok(JobViewInput { apply_url, ..self })
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
