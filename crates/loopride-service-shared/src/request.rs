//! Query decoding and validation for the round-trip endpoints.

use serde::{Deserialize, Serialize};

use loopride_lib::{RoundTripOptions, DEFAULT_MINUTES};

use crate::problem::{
    ApiError, INVALID_COORDINATES_MESSAGE, INVALID_MINUTES_MESSAGE, MISSING_COORDINATES_MESSAGE,
};

/// Validation trait for request types.
///
/// Implementations turn raw, stringly-typed input into a validated value or
/// an [`ApiError`] describing the first problem found.
pub trait Validate {
    /// The validated form of the request.
    type Output;

    /// Validate the request.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ApiError`. The error is boxed to keep `Result` small.
    fn validate(&self, request_id: &str) -> Result<Self::Output, Box<ApiError>>;
}

/// Raw query string of a round-trip request.
///
/// Everything is kept as text so numeric coercion and error messages stay
/// under our control rather than the extractor's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundTripQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// Ride duration; numeric strings such as `"30.0"` are accepted.
    pub minutes: Option<String>,
    /// `1`, `true`, `yes`, or `on` (any case) enable encoded polylines.
    pub points_encoded: Option<String>,
}

impl RoundTripQuery {
    /// Build from decoded query pairs. A repeated key keeps its last value;
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                "minutes" => &mut query.minutes,
                "points_encoded" => &mut query.points_encoded,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }
}

impl Validate for RoundTripQuery {
    type Output = RoundTripOptions;

    fn validate(&self, request_id: &str) -> Result<RoundTripOptions, Box<ApiError>> {
        let (Some(lat_raw), Some(lon_raw)) = (self.lat.as_deref(), self.lon.as_deref()) else {
            return Err(Box::new(ApiError::bad_request(
                MISSING_COORDINATES_MESSAGE,
                request_id,
            )));
        };

        let (Some(lat), Some(lon)) = (parse_finite(lat_raw), parse_finite(lon_raw)) else {
            return Err(Box::new(ApiError::bad_request(
                INVALID_COORDINATES_MESSAGE,
                request_id,
            )));
        };

        let minutes = match self.minutes.as_deref() {
            None => DEFAULT_MINUTES,
            Some(raw) => parse_minutes(raw).ok_or_else(|| {
                Box::new(ApiError::bad_request(INVALID_MINUTES_MESSAGE, request_id))
            })?,
        };

        Ok(RoundTripOptions::new(lat, lon)
            .with_minutes(minutes)
            .with_points_encoded(parse_bool(self.points_encoded.as_deref())))
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a numeric string to whole minutes, truncating any fraction.
fn parse_minutes(raw: &str) -> Option<u32> {
    let minutes = parse_finite(raw)?.trunc();
    if minutes < 1.0 || minutes > f64::from(u32::MAX) {
        return None;
    }
    Some(minutes as u32)
}

fn parse_bool(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
}
