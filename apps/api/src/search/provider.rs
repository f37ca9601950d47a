//! Job search provider: where completions come from.
//!
//! Default: `PerplexitySearch` (web-grounded chat completion via `LlmClient`).
//! `AppState` holds an `Arc<dyn JobSearchProvider>` so handlers and tests never
//! depend on the concrete backend.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Returns the raw completion text for one search prompt.
    async fn fetch_completion(&self, system: &str, query: &str) -> Result<String, AppError>;
}

pub struct PerplexitySearch(pub LlmClient);

#[async_trait]
impl JobSearchProvider for PerplexitySearch {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn fetch_completion(&self, system: &str, query: &str) -> Result<String, AppError> {
        Ok(self.0.complete(system, query).await?)
    }
}
