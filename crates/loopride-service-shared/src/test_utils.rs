//! Test utilities for handler testing.
//!
//! Handlers are exercised against a fake GraphHopper from
//! `loopride_lib::test_utils`; these helpers build state pointing at it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use loopride_lib::GraphHopperSettings;

use crate::state::AppState;

/// Upstream timeout used by test state, short enough for timeout tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Build an [`AppState`] talking to `base_url` with default settings.
///
/// # Panics
///
/// Panics if `base_url` is not a valid URL.
pub fn test_state(base_url: impl Into<String>) -> AppState {
    let settings = GraphHopperSettings::default()
        .with_base_url(base_url)
        .with_timeout(TEST_TIMEOUT);
    AppState::new(settings).unwrap_or_else(|e| panic!("failed to build test state: {}", e))
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-{}", timestamp)
}
