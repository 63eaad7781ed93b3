use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::identity::IdentityParseError;
use crate::services::providers::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The vision answer did not match the mandated `name by artist` format.
    #[error("Malformed vision answer: {0}")]
    MalformedIdentity(#[from] IdentityParseError),

    /// An external AI provider call failed. No retries are attempted.
    #[error("Upstream provider error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, error_message, details) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::MalformedIdentity(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Vision answer did not match the expected format".to_string(),
                Some(err.to_string()),
            ),
            AppError::Upstream(ProviderError::RateLimited) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Upstream provider rate limited the request".to_string(),
                None,
            ),
            AppError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                "Upstream provider call failed".to_string(),
                Some(err.to_string()),
            ),
            AppError::Config(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
