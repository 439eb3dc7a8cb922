//! Prometheus metrics for Loopride services.
//!
//! - [`MetricsConfig`] / [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler for the `/metrics` endpoint
//! - `record_*` helpers for round-trip business metrics
//!
//! # Example
//!
//! ```no_run
//! use loopride_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// - `METRICS_ENABLED`: "false" disables metrics (default: enabled)
    /// - `METRICS_PATH`: endpoint path (default: "/metrics")
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = endpoint_path(std::env::var("METRICS_PATH").ok().as_deref());

        Self { enabled, path }
    }

    /// Route for the metrics endpoint, always starting with `/`.
    pub fn endpoint_path(&self) -> String {
        endpoint_path(Some(self.path.as_str()))
    }
}

/// Blank falls back to `/metrics`; a missing leading `/` is added.
fn endpoint_path(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => "/metrics".to_string(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{}", p),
    }
}

/// Install the Prometheus recorder. Must be called once, before any metric
/// is recorded; metrics recorded earlier are dropped.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Axum handler rendering the Prometheus exposition format.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Count a round trip served successfully in `mode` ("summary" or "legacy").
pub fn record_round_trip(mode: &str) {
    metrics::counter!("loopride_round_trips_total", "mode" => mode.to_string()).increment(1);
}

/// Count a failed round trip.
///
/// `reason` is `validation_error` or an upstream error kind such as
/// `invalid_shape`.
pub fn record_round_trip_failed(reason: &str, mode: &str) {
    metrics::counter!(
        "loopride_round_trips_failed_total",
        "reason" => reason.to_string(),
        "mode" => mode.to_string()
    )
    .increment(1);
}

/// Time spent in the upstream call plus normalization.
pub fn record_upstream_duration(seconds: f64, outcome: &str) {
    metrics::histogram!(
        "loopride_upstream_duration_seconds",
        "outcome" => outcome.to_string()
    )
    .record(seconds);
}

/// Distance of a returned route, when GraphHopper reported one.
pub fn record_route_distance(meters: f64) {
    metrics::histogram!("loopride_route_distance_meters").record(meters);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_endpoint_path_gets_leading_slash() {
        assert_eq!(endpoint_path(None), "/metrics");
        assert_eq!(endpoint_path(Some("  ")), "/metrics");
        assert_eq!(endpoint_path(Some("/prom")), "/prom");
        assert_eq!(endpoint_path(Some("metrics")), "/metrics");
        assert_eq!(endpoint_path(Some("internal/metrics")), "/internal/metrics");

        let config = MetricsConfig {
            path: "prom".to_string(),
            ..MetricsConfig::default()
        };
        assert_eq!(config.endpoint_path(), "/prom");
    }

    #[test]
    fn test_disabled_metrics_refuse_to_initialize() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(matches!(init_metrics(&config), Err(MetricsError::Disabled)));
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        record_round_trip("summary");
        record_round_trip_failed("invalid_shape", "legacy");
        record_upstream_duration(0.25, "ok");
        record_route_distance(7500.0);
    }

    #[tokio::test]
    async fn test_handler_without_recorder() {
        if prometheus_handle_installed() {
            return;
        }
        assert_eq!(metrics_handler().await, "# Metrics not initialized\n");
    }

    fn prometheus_handle_installed() -> bool {
        PROMETHEUS_HANDLE.get().is_some()
    }

    #[test]
    fn test_error_display() {
        assert_eq!(MetricsError::Disabled.to_string(), "metrics are disabled");
        assert!(MetricsError::InstallFailed("boom".to_string())
            .to_string()
            .contains("boom"));
    }
}
