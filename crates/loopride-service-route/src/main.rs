//! Loopride round-trip route service binary.
//!
//! # Configuration
//!
//! - `GRAPHHOPPER_*` - upstream settings, see `loopride_lib::settings`
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus endpoint

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use loopride_lib::GraphHopperSettings;
use loopride_service_route::{router, SERVICE_NAME};
use loopride_service_shared::{init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env().with_service(SERVICE_NAME);
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let port = service_port(env::var("SERVICE_PORT").ok().as_deref());
    let settings = GraphHopperSettings::from_env();

    info!(port, base_url = %settings.base_url, "starting route service");

    let state = AppState::new(settings).context("failed to initialize application state")?;
    let app = router(state, &metrics_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = %addr, "listening on");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn service_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim) {
        None => DEFAULT_PORT,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(value, default = DEFAULT_PORT, "invalid SERVICE_PORT, using default");
            DEFAULT_PORT
        }),
    }
}
