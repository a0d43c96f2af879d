//! Health check endpoint
//!
//! Provides a simple health check for monitoring and load balancers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether an upstream credential was found at startup
    pub credential_configured: bool,
}

/// Health check handler
///
/// Always 200; a missing credential does not make the process unhealthy,
/// generation requests answer 500 until it is configured.
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            credential_configured: state.api_key().is_some(),
        }),
    )
}
