//! The round-trip pipeline: estimate, build, fetch, normalize.

use tracing::{debug, info};

use crate::client::GraphHopperClient;
use crate::error::UpstreamError;
use crate::normalize::{normalize, NormalizedRoute};
use crate::query::{RoundTripOptions, UpstreamQuery};
use crate::settings::GraphHopperSettings;

/// Request a round-trip route around `options` and normalize the answer.
///
/// Makes exactly one upstream call. Every failure, transport or shape, comes
/// back as an [`UpstreamError`].
pub async fn request_round_trip_route(
    client: &GraphHopperClient,
    settings: &GraphHopperSettings,
    options: &RoundTripOptions,
) -> Result<NormalizedRoute, UpstreamError> {
    let query = UpstreamQuery::build(options, settings);
    debug!(
        minutes = options.minutes,
        speed_kmh = settings.average_speed_kmh,
        distance_meters = query.round_trip_distance,
        "derived round-trip distance"
    );

    let payload = client.fetch_route(&query).await?;
    let route = normalize(&payload, options.points_encoded)?;

    info!(
        point = %query.point,
        target_distance = query.round_trip_distance,
        distance_meters = %route.distance_meters,
        points_encoded = options.points_encoded,
        "round trip computed"
    );

    Ok(route)
}
