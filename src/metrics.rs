//! Prometheus metrics collection for Letterpress
//!
//! Tracks how generation requests end and how long the upstream call takes.
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::error::AppError;

/// How a generation request ended
///
/// Restricting outcome labels to this enum keeps cardinality fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    MethodNotAllowed,
    BadRequest,
    PayloadTooLarge,
    Misconfigured,
    UpstreamError,
    EmptyCompletion,
    InternalError,
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::MethodNotAllowed => "method_not_allowed",
            Outcome::BadRequest => "bad_request",
            Outcome::PayloadTooLarge => "payload_too_large",
            Outcome::Misconfigured => "misconfigured",
            Outcome::UpstreamError => "upstream_error",
            Outcome::EmptyCompletion => "empty_completion",
            Outcome::InternalError => "internal_error",
        }
    }
}

impl From<&AppError> for Outcome {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::MethodNotAllowed => Outcome::MethodNotAllowed,
            AppError::MissingFields => Outcome::BadRequest,
            AppError::PayloadTooLarge => Outcome::PayloadTooLarge,
            AppError::MissingCredential => Outcome::Misconfigured,
            AppError::Upstream { .. } => Outcome::UpstreamError,
            AppError::EmptyCompletion => Outcome::EmptyCompletion,
            _ => Outcome::InternalError,
        }
    }
}

/// Metrics collector for Letterpress
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    generations_total: IntCounterVec,
    upstream_duration: Histogram,
}

impl Metrics {
    /// Create a new Metrics instance registered with a fresh registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generations_total = IntCounterVec::new(
            Opts::new(
                "letterpress_generations_total",
                "Total number of cover letter requests by outcome",
            ),
            &["outcome"],
        )?;

        // Free-tier models routinely take tens of seconds
        let upstream_duration = Histogram::with_opts(
            HistogramOpts::new(
                "letterpress_upstream_duration_seconds",
                "Latency of the upstream chat-completion call in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        )?;

        registry.register(Box::new(generations_total.clone()))?;
        registry.register(Box::new(upstream_duration.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            generations_total,
            upstream_duration,
        })
    }

    /// Count one finished generation request
    pub fn record_outcome(&self, outcome: Outcome) {
        self.generations_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// Observe the duration of one upstream call
    pub fn record_upstream_duration(&self, seconds: f64) -> Result<(), prometheus::Error> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be finite and non-negative, got: {}",
                seconds
            )));
        }
        self.upstream_duration.observe(seconds);
        Ok(())
    }

    /// Current count for `outcome`
    pub fn outcome_count(&self, outcome: Outcome) -> u64 {
        self.generations_total
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    /// Encode all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        tracing::debug!(
            metric_family_count = metric_families.len(),
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("Metrics output is not UTF-8: {}", e)))
    }
}
