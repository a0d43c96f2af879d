//! HTTP request handlers for the Letterpress API

use crate::config::{ApiKey, Config};
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::upstream::CompletionClient;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod generate;
pub mod health;
pub mod metrics;

/// Path of the cover letter endpoint
pub const GENERATE_PATH: &str = "/api/generate";

/// Application state shared across all handlers
///
/// Everything in here is read-only after startup. Clones are cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    api_key: Option<ApiKey>,
    client: CompletionClient,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create state with an explicitly supplied credential
    pub fn new(config: Arc<Config>, api_key: Option<ApiKey>) -> AppResult<Self> {
        let client = CompletionClient::new(&config.upstream)
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to register metrics: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
            metrics: Arc::new(metrics),
        })
    }

    /// Create state reading the credential from the environment variable
    /// named in `upstream.api_key_env`
    pub fn from_env(config: Arc<Config>) -> AppResult<Self> {
        let api_key = config.upstream.resolve_api_key();
        Self::new(config, api_key)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            GENERATE_PATH,
            post(generate::handler).fallback(generate::method_not_allowed),
        )
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
}
