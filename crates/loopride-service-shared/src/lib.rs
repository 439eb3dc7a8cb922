//! Shared infrastructure for Loopride HTTP services.
//!
//! - [`AppState`]: resolved GraphHopper settings and the shared HTTP client
//! - [`health`]: liveness and readiness handlers
//! - [`ApiError`]: JSON error bodies with deterministic status codes
//! - [`RoundTripResponse`]: summary and legacy success bodies
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: structured JSON logging setup
//! - [`middleware`]: request IDs, request spans, HTTP metrics
//!
//! # Architecture
//!
//! Handlers stay thin. Routing logic lives in `loopride-lib`; this crate only
//! holds HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Decode query string                                      │
//! │  - Validate parameters                                      │
//! │  - Call loopride-lib                                        │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent crates.

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_round_trip, record_round_trip_failed,
    record_route_distance, record_upstream_duration, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_upstream_error, ApiError, INVALID_COORDINATES_MESSAGE, INVALID_MINUTES_MESSAGE,
    MISSING_COORDINATES_MESSAGE, UPSTREAM_ERROR,
};
pub use request::{RoundTripQuery, Validate};
pub use response::{ResponseMode, RoundTripResponse};
pub use state::{AppState, AppStateError};
