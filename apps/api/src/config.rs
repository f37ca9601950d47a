use anyhow::{Context, Result};

use crate::search::normalizer::DEFAULT_MAX_RESULTS;

const DEFAULT_PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";
const DEFAULT_PERPLEXITY_MODEL: &str = "sonar";
/// Hard ceiling on listings per search, whatever the environment says.
const MAX_RESULTS_CEILING: usize = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// `PERPLEXITY_API_KEY` is optional here: without it the service still starts and
/// each search answers with a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub perplexity_api_key: Option<String>,
    pub perplexity_api_url: String,
    pub perplexity_model: String,
    pub search_max_results: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY"),
            perplexity_api_url: optional_env("PERPLEXITY_API_URL")
                .unwrap_or_else(|| DEFAULT_PERPLEXITY_API_URL.to_string()),
            perplexity_model: optional_env("PERPLEXITY_MODEL")
                .unwrap_or_else(|| DEFAULT_PERPLEXITY_MODEL.to_string()),
            search_max_results: parse_max_results(optional_env("SEARCH_MAX_RESULTS").as_deref())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_max_results(raw: Option<&str>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_RESULTS);
    };
    let value = raw
        .trim()
        .parse::<usize>()
        .context("SEARCH_MAX_RESULTS must be a positive integer")?;
    Ok(value.clamp(1, MAX_RESULTS_CEILING))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_results_defaults_to_eight() {
        assert_eq!(parse_max_results(None).unwrap(), 8);
    }

    #[test]
    fn test_max_results_is_clamped() {
        assert_eq!(parse_max_results(Some("25")).unwrap(), 10);
        assert_eq!(parse_max_results(Some("0")).unwrap(), 1);
        assert_eq!(parse_max_results(Some(" 6 ")).unwrap(), 6);
    }

    #[test]
    fn test_max_results_rejects_garbage() {
        assert!(parse_max_results(Some("eight")).is_err());
    }
}
