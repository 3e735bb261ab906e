//! Prometheus Metrics Definitions
//!
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use fleetlog_audit::AuditOutcome;
use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

use crate::error::{ApiError, ApiResult};

/// Global metrics instance - initialized once on first use
pub static METRICS: Lazy<ApiResult<FleetlogMetrics>> = Lazy::new(FleetlogMetrics::new);

/// Container for all FLEETLOG metrics.
#[derive(Clone)]
pub struct FleetlogMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// Mileage audit runs - labels: outcome
    pub audit_runs_total: CounterVec,
}

impl FleetlogMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "fleetlog_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register http_requests_total: {}", e))
            })?,

            audit_runs_total: register_counter_vec!(
                "fleetlog_audit_runs_total",
                "Total mileage audit runs by outcome",
                &["outcome"]
            )
            .map_err(|e| {
                ApiError::internal_error(format!("Failed to register audit_runs_total: {}", e))
            })?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
    }

    /// Record an audit result. `None` means the audit itself failed.
    pub fn record_audit(&self, outcome: Option<&AuditOutcome>) {
        self.audit_runs_total
            .with_label_values(&[outcome_label(outcome)])
            .inc();
    }
}

/// Stable label for an audit outcome.
pub fn outcome_label(outcome: Option<&AuditOutcome>) -> &'static str {
    match outcome {
        None => "error",
        Some(AuditOutcome::Skipped(_)) => "skipped",
        Some(AuditOutcome::Clean(_)) => "clean",
        Some(AuditOutcome::Alerted(_)) => "alerted",
        Some(AuditOutcome::AlertNotConfigured(_)) => "alert_not_configured",
        Some(AuditOutcome::AlertFailed { .. }) => "alert_failed",
    }
}

/// Record an audit result on the global registry, if it initialized.
pub fn record_audit(outcome: Option<&AuditOutcome>) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_audit(outcome);
    }
}

/// Handler for GET /metrics endpoint.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
