use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Search limit reached: {0}")]
    QuotaExceeded(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        let message = e.to_string();
        match e {
            LlmError::MissingApiKey => AppError::Configuration(message),
            LlmError::Api {
                message: upstream, ..
            } => {
                tracing::debug!("Upstream error body: {upstream}");
                AppError::Llm(message)
            }
            _ => AppError::Llm(message),
        }
    }
}

impl AppError {
    /// Status, machine code and client-safe message. Server-side failures are logged here.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::QuotaExceeded(msg) => {
                (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED", msg.clone())
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Error shape of the search endpoint: `{ "error": "...", "jobs": [] }`.
/// Status codes follow `AppError`.
#[derive(Debug)]
pub struct SearchFailure(pub AppError);

impl From<AppError> for SearchFailure {
    fn from(e: AppError) -> Self {
        SearchFailure(e)
    }
}

impl IntoResponse for SearchFailure {
    fn into_response(self) -> Response {
        let (status, _, message) = self.0.parts();
        let body = Json(json!({
            "error": message,
            "jobs": []
        }));
        (status, body).into_response()
    }
}
