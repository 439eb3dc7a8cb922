//! Application state for HTTP services.
//!
//! Holds the resolved GraphHopper settings and the single HTTP client built
//! from them. Nothing in here changes after startup.

use std::sync::Arc;

use loopride_lib::{Error as LibError, GraphHopperClient, GraphHopperSettings};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The GraphHopper client could not be built from the settings.
    Client(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(e) => write!(f, "failed to build GraphHopper client: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::Client(err)
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable; share it through axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use loopride_lib::GraphHopperSettings;
/// use loopride_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let client = state.client();
///     // ... call GraphHopper
/// }
///
/// let state = AppState::new(GraphHopperSettings::from_env()).unwrap();
/// let app = Router::new()
///     .route("/api/v1/routes/round-trip", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    settings: GraphHopperSettings,
    client: GraphHopperClient,
}

impl AppState {
    /// Build state from resolved settings.
    pub fn new(settings: GraphHopperSettings) -> Result<Self, AppStateError> {
        let client = GraphHopperClient::new(&settings)?;
        tracing::info!(
            base_url = %settings.base_url,
            profile = %settings.profile,
            algorithm = %settings.algorithm,
            average_speed_kmh = settings.average_speed_kmh,
            timeout_ms = settings.request_timeout.as_millis() as u64,
            "GraphHopper client configured"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { settings, client }),
        })
    }

    pub fn settings(&self) -> &GraphHopperSettings {
        &self.inner.settings
    }

    pub fn client(&self) -> &GraphHopperClient {
        &self.inner.client
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.inner.settings.base_url)
            .field("profile", &self.inner.settings.profile)
            .finish()
    }
}
