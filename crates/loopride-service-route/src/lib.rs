//! Loopride round-trip route HTTP service.
//!
//! Given a starting point and a ride duration, asks GraphHopper for a cycling
//! loop and returns the normalized route.
//!
//! # Endpoints
//!
//! - `GET /api/v1/routes/round-trip` - route summary object
//! - `GET /api/paths/route/` - bare geometry, for the existing web frontend
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe

use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use loopride_lib::request_round_trip_route;
use loopride_service_shared::{
    from_upstream_error, health_live, health_ready, metrics_handler, record_round_trip,
    record_round_trip_failed, record_route_distance, record_upstream_duration, ApiError, AppState,
    MetricsConfig, MetricsLayer, RequestId, ResponseMode, RoundTripQuery, RoundTripResponse,
    Validate,
};

/// Service name attached to request spans.
pub const SERVICE_NAME: &str = "route";

pub const ROUND_TRIP_PATH: &str = "/api/v1/routes/round-trip";
pub const LEGACY_ROUTE_PATH: &str = "/api/paths/route/";

/// Build the service router.
///
/// The metrics endpoint is mounted at `metrics.path` unless metrics are
/// disabled; a path without a leading `/` gets one.
pub fn router(state: AppState, metrics: &MetricsConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let mut app = Router::new()
        .route(ROUND_TRIP_PATH, get(round_trip_summary))
        .route(LEGACY_ROUTE_PATH, get(round_trip_legacy))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready));

    if metrics.enabled {
        app = app.route(&metrics.endpoint_path(), get(metrics_handler));
    }

    app.layer(cors)
        .layer(MetricsLayer::new(SERVICE_NAME))
        .with_state(state)
}

async fn round_trip_summary(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<RoundTripResponse, ApiError> {
    round_trip(ResponseMode::Summary, &state, &request_id, query).await
}

async fn round_trip_legacy(
    State(state): State<AppState>,
    request_id: RequestId,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<RoundTripResponse, ApiError> {
    round_trip(ResponseMode::Legacy, &state, &request_id, query).await
}

/// Validate, call GraphHopper once, and render the route in `mode`.
async fn round_trip(
    mode: ResponseMode,
    state: &AppState,
    request_id: &RequestId,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<RoundTripResponse, ApiError> {
    let request_id = request_id.as_str();

    // An undecodable query string carries no usable parameters.
    let raw = match query {
        Ok(Query(pairs)) => RoundTripQuery::from_pairs(pairs),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "could not decode query string");
            RoundTripQuery::default()
        }
    };

    let options = raw.validate(request_id).map_err(|error| {
        warn!(error = %error, "rejected round-trip request");
        record_round_trip_failed("validation_error", mode.as_str());
        *error
    })?;

    info!(
        lat = options.lat,
        lon = options.lon,
        minutes = options.minutes,
        points_encoded = options.points_encoded,
        mode = mode.as_str(),
        "handling round-trip request"
    );

    let start = Instant::now();
    let result = request_round_trip_route(state.client(), state.settings(), &options).await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(route) => {
            record_upstream_duration(elapsed, "ok");
            if let Some(meters) = route.distance_meters.as_f64() {
                record_route_distance(meters);
            }
            record_round_trip(mode.as_str());
            Ok(RoundTripResponse::render(route, mode))
        }
        Err(e) => {
            let kind = e.kind().as_str();
            record_upstream_duration(elapsed, kind);
            record_round_trip_failed(kind, mode.as_str());
            Err(from_upstream_error(&e, request_id))
        }
    }
}
