//! GraphHopper connection settings.
//!
//! Settings are resolved once at startup and then shared read-only by every
//! request. Values come from environment variables, but resolution goes
//! through a lookup function so tests can supply their own values without
//! touching the process environment.

use std::time::Duration;

use tracing::warn;

use crate::estimate::average_speed_from_raw;

pub const BASE_URL_ENV: &str = "GRAPHHOPPER_BASE_URL";
pub const PROFILE_ENV: &str = "GRAPHHOPPER_PROFILE";
pub const ALGORITHM_ENV: &str = "GRAPHHOPPER_ALGORITHM";
pub const CH_DISABLE_ENV: &str = "GRAPHHOPPER_CH_DISABLE";
pub const AVERAGE_SPEED_ENV: &str = "GRAPHHOPPER_AVERAGE_SPEED_KMH";
pub const REQUEST_TIMEOUT_ENV: &str = "GRAPHHOPPER_REQUEST_TIMEOUT_SECONDS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8989";
pub const DEFAULT_PROFILE: &str = "bike";
pub const DEFAULT_ALGORITHM: &str = "round_trip";
pub const DEFAULT_CH_DISABLE: &str = "true";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

/// Immutable configuration for talking to a GraphHopper instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphHopperSettings {
    /// Base URL of the routing engine, without the `/route` suffix.
    pub base_url: String,
    /// Vehicle profile, e.g. `bike`.
    pub profile: String,
    /// Routing algorithm, normally `round_trip`.
    pub algorithm: String,
    /// Value sent as `ch.disable`, already lowercased.
    pub ch_disable: String,
    /// Average riding speed used to turn minutes into meters.
    pub average_speed_kmh: f64,
    /// Upper bound for a single upstream call.
    pub request_timeout: Duration,
}

impl Default for GraphHopperSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
            ch_disable: DEFAULT_CH_DISABLE.to_string(),
            average_speed_kmh: crate::estimate::DEFAULT_AVERAGE_SPEED_KMH,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl GraphHopperSettings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary lookup.
    ///
    /// Missing values fall back to the defaults. An unparsable average speed
    /// silently becomes the default speed; an unusable timeout is logged and
    /// replaced with the default timeout.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let base_url = non_empty(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let profile = non_empty(PROFILE_ENV).unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let algorithm = non_empty(ALGORITHM_ENV).unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
        let ch_disable = non_empty(CH_DISABLE_ENV)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_CH_DISABLE.to_string());
        let average_speed_kmh = average_speed_from_raw(lookup(AVERAGE_SPEED_ENV).as_deref());
        let request_timeout = timeout_from_raw(non_empty(REQUEST_TIMEOUT_ENV).as_deref());

        Self {
            base_url,
            profile,
            algorithm,
            ch_disable,
            average_speed_kmh,
            request_timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_average_speed_kmh(mut self, kmh: f64) -> Self {
        self.average_speed_kmh = kmh;
        self
    }
}

fn timeout_from_raw(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return Duration::from_secs(DEFAULT_TIMEOUT_SECONDS);
    };

    match raw.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 && secs <= MAX_TIMEOUT_SECONDS => {
            Duration::from_secs_f64(secs)
        }
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_TIMEOUT_SECONDS,
                "ignoring invalid GraphHopper request timeout"
            );
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        }
    }
}
