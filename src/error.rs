//! Error types for Letterpress
//!
//! All errors implement `IntoResponse` for Axum handlers. This is the only
//! place where outward status codes and error messages are decided.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Message returned for every failure whose detail must not reach the caller
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("OpenRouter API key not configured")]
    MissingCredential,

    /// Non-success answer from the upstream, passed through as-is
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("No cover letter generated")]
    EmptyCompletion,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },
}

impl AppError {
    /// HTTP status this error is answered with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { status, .. } => *status,
            Self::MissingCredential
            | Self::EmptyCompletion
            | Self::Internal(_)
            | Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Upstream { status, message } => serde_json::json!({
                "error": message,
                "status": status.as_u16(),
            }),
            Self::MethodNotAllowed
            | Self::MissingFields
            | Self::PayloadTooLarge
            | Self::MissingCredential
            | Self::EmptyCompletion => serde_json::json!({
                "error": self.to_string(),
            }),
            _ => {
                tracing::error!(error = %self, "Request failed with internal error");
                serde_json::json!({
                    "error": INTERNAL_ERROR_MESSAGE,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
