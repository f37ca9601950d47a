// Prompt text for the job search completion.

use crate::search::models::SearchRequest;

/// System prompt: asks for a JSON array in the exact `JobListing` shape.
pub const SEARCH_SYSTEM: &str = "You are a job search specialist. \
    Provide specific, real job listings with company names, job titles, locations, \
    salary ranges when available, brief descriptions, and most importantly - direct application URLs. \
    Format your response as a JSON array with objects containing: \
    title, company, location, salary, description, apply_url, and source fields. \
    The apply_url should be a direct link to apply for the job.";

const SEARCH_DETAILS: &str = "Please provide specific job listings with:
1. Company name
2. Job title
3. Location
4. Salary range (if available)
5. Brief job description
6. Direct application link or company careers page URL

Focus on recent postings from major job boards like Indeed, LinkedIn Jobs, Glassdoor, \
AngelList, and company career pages. Include the direct URL where candidates can apply \
for each position.";

/// Builds the user message for one search from the caller's preferences.
pub fn build_search_query(request: &SearchRequest, max_results: usize) -> String {
    let titles = join_or(&request.job_titles, "any position");
    let locations = join_or(&request.locations, "any location");
    let experience = if request.years_experience > 0.0 {
        format!(
            " for candidates with {} years of experience",
            format_years(request.years_experience)
        )
    } else {
        String::new()
    };

    format!(
        "Find {max_results} current job openings for {titles} positions in {locations}{experience}. \n\n{SEARCH_DETAILS}"
    )
}

/// `3.0` renders as "3", `2.5` as "2.5".
fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.0}")
    } else {
        years.to_string()
    }
}

fn join_or(values: &[String], fallback: &str) -> String {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        fallback.to_string()
    } else {
        values.join(" or ")
    }
}
