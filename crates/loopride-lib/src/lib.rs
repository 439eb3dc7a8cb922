//! Loopride library entry points.
//!
//! This crate turns a starting point and a ride duration into a round-trip
//! cycling route by asking a GraphHopper instance for a loop of matching
//! length. Services should call [`request_round_trip_route`] rather than
//! wiring the individual steps themselves.
//!
//! ```text
//! RoundTripOptions ─▶ estimate ─▶ UpstreamQuery ─▶ GraphHopperClient ─▶ normalize ─▶ NormalizedRoute
//! ```

pub mod client;
pub mod error;
pub mod estimate;
pub mod normalize;
pub mod query;
pub mod roundtrip;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{GraphHopperClient, UpstreamResponse};
pub use error::{Error, Result, UpstreamError, UpstreamErrorKind};
pub use estimate::{estimate_distance_meters, DEFAULT_AVERAGE_SPEED_KMH};
pub use normalize::{normalize, NormalizedRoute, RouteGeometry};
pub use query::{RoundTripOptions, UpstreamQuery, DEFAULT_MINUTES};
pub use roundtrip::request_round_trip_route;
pub use settings::GraphHopperSettings;
