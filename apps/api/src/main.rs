mod config;
mod dashboard;
mod db;
mod errors;
mod llm_client;
mod models;
mod profile;
mod routes;
mod saved_jobs;
mod search;
mod state;
mod subscription;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::{build_router, cors_layer};
use crate::search::provider::PerplexitySearch;
use crate::state::AppState;
use crate::subscription::metering::PgSearchMeter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobfinder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(LlmSettings {
        api_url: config.perplexity_api_url.clone(),
        model: config.perplexity_model.clone(),
        api_key: config.perplexity_api_key.clone(),
    })
    .context("Failed to build HTTP client for the LLM API")?;
    info!("LLM client initialized (model: {})", llm.model());

    if config.perplexity_api_key.is_none() {
        warn!("PERPLEXITY_API_KEY is not set; job searches will fail until it is configured");
    }

    // Build app state
    let state = AppState {
        meter: Arc::new(PgSearchMeter::new(db.clone())),
        db,
        config: config.clone(),
        search: Arc::new(PerplexitySearch(llm)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
