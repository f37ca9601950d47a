//! One search cycle: prompt → provider → normalizer.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::search::models::{JobListing, SearchRequest};
use crate::search::normalizer::normalize;
use crate::search::prompts::{build_search_query, SEARCH_SYSTEM};
use crate::search::provider::JobSearchProvider;

/// Runs a search. Provider failures are returned as errors and the normalizer is
/// skipped; anything the provider does return is normalized without failing.
pub async fn search_jobs(
    provider: &dyn JobSearchProvider,
    request: &SearchRequest,
    max_results: usize,
) -> Result<Vec<JobListing>, AppError> {
    let query = build_search_query(request, max_results);
    info!(
        "Job search via {}: {} titles, {} locations",
        provider.name(),
        request.job_titles.len(),
        request.locations.len()
    );
    debug!("Job search query: {query}");

    let completion = provider.fetch_completion(SEARCH_SYSTEM, &query).await?;
    debug!("Raw completion ({} chars): {completion}", completion.len());

    let jobs = normalize(&completion, max_results);
    info!("Job search returned {} listings", jobs.len());
    Ok(jobs)
}
