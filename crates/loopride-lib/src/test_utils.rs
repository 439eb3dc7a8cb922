//! Test utilities: a fake GraphHopper server.
//!
//! The fake listens on an ephemeral local port, answers `/route` with a
//! canned status and body, answers `/health` with `OK`, and records every
//! query string it receives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type RecordedQueries = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Builder for a canned GraphHopper instance.
#[derive(Debug, Clone)]
pub struct FakeGraphHopper {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl FakeGraphHopper {
    /// Answer `/route` with `status` and a raw `body`.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    /// Answer `/route` with 200 and `payload` serialized as JSON.
    pub fn json(payload: Value) -> Self {
        Self::new(200, payload.to_string())
    }

    /// Wait before answering `/route`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Bind an ephemeral port and start serving in the background.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(self) -> RunningGraphHopper {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake GraphHopper listener");
        let addr = listener.local_addr().expect("fake GraphHopper address");

        let queries: RecordedQueries = Arc::default();
        let state = Arc::new(FakeState {
            canned: self,
            queries: Arc::clone(&queries),
        });

        let app = Router::new()
            .route("/route", get(route))
            .route("/health", get(|| async { "OK" }))
            .with_state(state);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        RunningGraphHopper {
            addr,
            queries,
            task,
        }
    }
}

struct FakeState {
    canned: FakeGraphHopper,
    queries: RecordedQueries,
}

async fn route(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state
        .queries
        .lock()
        .expect("fake GraphHopper query log poisoned")
        .push(params);

    if let Some(delay) = state.canned.delay {
        tokio::time::sleep(delay).await;
    }

    let status =
        StatusCode::from_u16(state.canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(CONTENT_TYPE, "application/json")],
        state.canned.body.clone(),
    )
        .into_response()
}

/// Handle to a fake GraphHopper; the server stops when this is dropped.
pub struct RunningGraphHopper {
    addr: SocketAddr,
    queries: RecordedQueries,
    task: JoinHandle<()>,
}

impl RunningGraphHopper {
    /// Base URL to configure a client with.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of `/route` calls received so far.
    pub fn request_count(&self) -> usize {
        self.queries
            .lock()
            .expect("fake GraphHopper query log poisoned")
            .len()
    }

    /// Query parameters of the most recent `/route` call.
    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.queries
            .lock()
            .expect("fake GraphHopper query log poisoned")
            .last()
            .cloned()
    }
}

impl Drop for RunningGraphHopper {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Base URL of a local port that nothing listens on.
pub async fn unused_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe listener address");
    drop(listener);
    format!("http://{addr}")
}
