use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::search::provider::JobSearchProvider;
use crate::subscription::metering::SearchMeter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Completion backend for job searches. Default: `PerplexitySearch`.
    pub search: Arc<dyn JobSearchProvider>,
    /// Search allowance for signed-in users. Default: `PgSearchMeter`.
    pub meter: Arc<dyn SearchMeter>,
}
