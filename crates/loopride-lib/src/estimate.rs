//! Ride duration to loop distance conversion.

/// Speed assumed when the configured value is missing or unparsable.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 15.0;

/// Lower bound for the derived speed, in meters per minute.
const MIN_SPEED_METERS_PER_MINUTE: f64 = 0.1;

/// Parse a configured average speed, falling back to
/// [`DEFAULT_AVERAGE_SPEED_KMH`] without complaint.
pub fn average_speed_from_raw(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(DEFAULT_AVERAGE_SPEED_KMH)
}

/// Meters covered per minute at `average_speed_kmh`, never below 0.1.
pub fn speed_meters_per_minute(average_speed_kmh: f64) -> f64 {
    // f64::max ignores NaN, so a NaN speed also lands on the floor.
    (average_speed_kmh * 1000.0 / 60.0).max(MIN_SPEED_METERS_PER_MINUTE)
}

/// Target round-trip distance in meters for a ride of `duration_minutes`.
///
/// The result is at least one meter. Halfway cases round to the even
/// neighbour.
///
/// ```
/// use loopride_lib::estimate_distance_meters;
///
/// assert_eq!(estimate_distance_meters(30, 15.0), 7500);
/// assert_eq!(estimate_distance_meters(1, 0.0), 1);
/// ```
pub fn estimate_distance_meters(duration_minutes: u32, average_speed_kmh: f64) -> u64 {
    let meters = (f64::from(duration_minutes) * speed_meters_per_minute(average_speed_kmh))
        .round_ties_even();
    // Saturating float-to-int cast; infinite speeds end up at u64::MAX.
    (meters as u64).max(1)
}
