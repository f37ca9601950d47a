use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One job posting as returned to clients. Every field is always populated once a
/// listing has passed through the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub apply_url: String,
    pub source: String,
}

/// Inbound search body. Field names follow the web client (`jobTitles`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_titles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<String>,
    /// Any JSON number; `null` and negatives mean "not given".
    #[serde(default, deserialize_with = "null_as_default")]
    pub years_experience: f64,
    /// When present the search is metered against the user's allowance and logged.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// `null` is treated like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub jobs: Vec<JobListing>,
}
