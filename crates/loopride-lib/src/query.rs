//! Round-trip request options and the GraphHopper query derived from them.

use crate::estimate::estimate_distance_meters;
use crate::settings::GraphHopperSettings;

/// Ride duration used when the caller does not ask for one.
pub const DEFAULT_MINUTES: u32 = 30;

/// Validated caller input for a round-trip route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTripOptions {
    pub lat: f64,
    pub lon: f64,
    /// Ride duration in minutes, at least one.
    pub minutes: u32,
    /// Ask GraphHopper for an encoded polyline instead of coordinates.
    pub points_encoded: bool,
}

impl RoundTripOptions {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            minutes: DEFAULT_MINUTES,
            points_encoded: false,
        }
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_points_encoded(mut self, points_encoded: bool) -> Self {
        self.points_encoded = points_encoded;
        self
    }
}

/// Query parameters for one GraphHopper `/route` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    /// `"lat,lon"`.
    pub point: String,
    pub profile: String,
    pub algorithm: String,
    pub ch_disable: String,
    pub round_trip_distance: u64,
    pub points_encoded: bool,
}

impl UpstreamQuery {
    /// Derive the upstream query for `options` under `settings`.
    pub fn build(options: &RoundTripOptions, settings: &GraphHopperSettings) -> Self {
        Self {
            point: format!("{},{}", options.lat, options.lon),
            profile: settings.profile.clone(),
            algorithm: settings.algorithm.clone(),
            ch_disable: settings.ch_disable.clone(),
            round_trip_distance: estimate_distance_meters(
                options.minutes,
                settings.average_speed_kmh,
            ),
            points_encoded: options.points_encoded,
        }
    }

    /// Key/value pairs in wire order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("point", self.point.clone()),
            ("profile", self.profile.clone()),
            ("algorithm", self.algorithm.clone()),
            ("ch.disable", self.ch_disable.clone()),
            ("round_trip.distance", self.round_trip_distance.to_string()),
            ("points_encoded", self.points_encoded.to_string()),
        ]
    }
}
