//! Health check handlers for Kubernetes probes.
//!
//! `/health/live` only says the process is up. `/health/ready` additionally
//! asks GraphHopper's own `/health` endpoint, since without it every route
//! request would fail.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Whether GraphHopper answered its health check (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_reachable: Option<bool>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            upstream_reachable: None,
        }
    }

    pub fn ready(service: &str, version: &str) -> Self {
        Self {
            upstream_reachable: Some(true),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            upstream_reachable: Some(false),
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"loopride-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// Returns 503 when GraphHopper cannot be reached or reports itself unhealthy.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match state.client().ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::ready(service, version))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "GraphHopper readiness check failed");
            let status = HealthStatus::not_ready(service, version, "GraphHopper unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
