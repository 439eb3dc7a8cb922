//! JSON error bodies for HTTP responses.
//!
//! Every failure path of the round-trip endpoints ends in an [`ApiError`],
//! which always renders as `{"error": ..., "detail"?: ..., "instance"?: ...}`
//! with a deterministic status code. The web frontend reads `detail` first and
//! falls back to `error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use loopride_lib::UpstreamError;

/// `error` value for failures reported by, or while reaching, GraphHopper.
pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";

pub const MISSING_COORDINATES_MESSAGE: &str = "Missing required query parameters: lat, lon";
pub const INVALID_COORDINATES_MESSAGE: &str = "Invalid lat/lon parameters";
pub const INVALID_MINUTES_MESSAGE: &str = "Invalid minutes parameter";

/// Error body returned by every Loopride endpoint.
///
/// # Example
///
/// ```
/// use loopride_service_shared::ApiError;
///
/// let error = ApiError::bad_request("Invalid minutes parameter", "req-12345");
/// assert_eq!(error.status, 400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status for this error; not part of the body.
    #[serde(skip)]
    pub status: u16,

    /// Short error message or code.
    pub error: String,

    /// Explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier for correlating with logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: error.into(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for invalid caller input.
    pub fn bad_request(message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message).with_request_id(request_id)
    }

    /// 502 for a GraphHopper answer that does not look like a route response.
    pub fn invalid_upstream_response(
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message).with_request_id(request_id)
    }

    /// `UPSTREAM_ERROR` with the given status.
    pub fn upstream(
        status: StatusCode,
        detail: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self::new(status, UPSTREAM_ERROR)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.error, detail),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Map an upstream failure to the error body the handler returns.
///
/// Shape violations mean GraphHopper's API drifted and are logged at warn.
pub fn from_upstream_error(error: &UpstreamError, request_id: &str) -> ApiError {
    match error {
        UpstreamError::InvalidShape { detail } => {
            warn!(request_id, detail = %detail, "GraphHopper response shape changed");
            ApiError::invalid_upstream_response(error.to_string(), request_id)
        }
        UpstreamError::Http { status, detail } => {
            // A status outside 100..=999 cannot be forwarded.
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            ApiError::upstream(status, detail.clone(), request_id)
        }
        UpstreamError::Unreachable { detail } | UpstreamError::InvalidJson { detail } => {
            ApiError::upstream(StatusCode::BAD_GATEWAY, detail.clone(), request_id)
        }
    }
}
