//! Success bodies for the round-trip endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use loopride_lib::NormalizedRoute;

/// How a successful round trip is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// `{coordinates|points, distance_meters, duration_ms, bbox, ascend, descend}`.
    #[default]
    Summary,
    /// Bare coordinate array or bare encoded polyline, for the legacy
    /// `/api/paths/route/` endpoint.
    Legacy,
}

impl ResponseMode {
    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseMode::Summary => "summary",
            ResponseMode::Legacy => "legacy",
        }
    }
}

/// Successful round-trip body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RoundTripResponse {
    Summary(NormalizedRoute),
    Legacy(Value),
}

impl RoundTripResponse {
    /// Encode `route` the way `mode` asks for.
    pub fn render(route: NormalizedRoute, mode: ResponseMode) -> Self {
        match mode {
            ResponseMode::Summary => RoundTripResponse::Summary(route),
            ResponseMode::Legacy => RoundTripResponse::Legacy(route.geometry.into_value()),
        }
    }
}

impl IntoResponse for RoundTripResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
