use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result, UpstreamError};
use crate::query::UpstreamQuery;
use crate::settings::GraphHopperSettings;

/// Raw decoded JSON returned by GraphHopper's `/route` endpoint.
pub type UpstreamResponse = Value;

const UNREACHABLE_DETAIL: &str = "GraphHopper service unreachable";
const EMPTY_ERROR_BODY_DETAIL: &str = "GraphHopper upstream error";
const INVALID_JSON_DETAIL: &str = "Invalid JSON payload from GraphHopper";

/// Thin async client for a GraphHopper instance.
///
/// One client is built at startup and cloned into every request; clones share
/// the underlying connection pool. Each call is a single attempt bounded by
/// the configured timeout.
#[derive(Debug, Clone)]
pub struct GraphHopperClient {
    http: Client,
    route_url: Url,
    health_url: Url,
}

impl GraphHopperClient {
    pub fn new(settings: &GraphHopperSettings) -> Result<Self> {
        let base = settings.base_url.trim_end_matches('/');
        let route_url = endpoint_url(base, "route")?;
        let health_url = endpoint_url(base, "health")?;

        let http = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(user_agent())
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http,
            route_url,
            health_url,
        })
    }

    /// Full URL of the route endpoint, without query parameters.
    pub fn route_url(&self) -> &Url {
        &self.route_url
    }

    /// Issue one `GET /route` and decode the JSON body.
    pub async fn fetch_route(
        &self,
        query: &UpstreamQuery,
    ) -> std::result::Result<UpstreamResponse, UpstreamError> {
        debug!(
            url = %self.route_url,
            point = %query.point,
            distance = query.round_trip_distance,
            "requesting GraphHopper round trip"
        );

        let response = self
            .http
            .get(self.route_url.clone())
            .header(ACCEPT, "application/json")
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if !status.is_success() {
            // Best effort: a body we cannot read still leaves us with the status.
            let body = response.bytes().await.unwrap_or_default();
            let text = String::from_utf8_lossy(&body).into_owned();
            let detail = if text.is_empty() {
                EMPTY_ERROR_BODY_DETAIL.to_string()
            } else {
                text
            };
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.bytes().await.map_err(unreachable)?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(error = %err, bytes = body.len(), "GraphHopper returned a non-JSON body");
            UpstreamError::InvalidJson {
                detail: INVALID_JSON_DETAIL.to_string(),
            }
        })
    }

    /// Check that GraphHopper answers its health endpoint with a 2xx status.
    pub async fn ping(&self) -> std::result::Result<(), UpstreamError> {
        let response = self
            .http
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Http {
                status: status.as_u16(),
                detail: format!("GraphHopper health check returned {status}"),
            })
        }
    }
}

fn endpoint_url(base: &str, path: &str) -> Result<Url> {
    let raw = format!("{base}/{path}");
    Url::parse(&raw).map_err(|err| Error::InvalidBaseUrl {
        url: base.to_string(),
        message: err.to_string(),
    })
}

fn unreachable(err: reqwest::Error) -> UpstreamError {
    warn!(
        error = %err,
        timeout = err.is_timeout(),
        connect = err.is_connect(),
        "GraphHopper request failed"
    );
    UpstreamError::Unreachable {
        detail: UNREACHABLE_DETAIL.to_string(),
    }
}

fn user_agent() -> String {
    format!("loopride/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::error::UpstreamErrorKind;
    use crate::query::RoundTripOptions;
    use crate::test_utils::{unused_local_url, FakeGraphHopper};

    fn query() -> UpstreamQuery {
        UpstreamQuery::build(
            &RoundTripOptions::new(45.5, -73.6),
            &GraphHopperSettings::default(),
        )
    }

    fn client_for(base_url: &str) -> GraphHopperClient {
        let settings = GraphHopperSettings::default()
            .with_base_url(base_url)
            .with_timeout(Duration::from_millis(500));
        GraphHopperClient::new(&settings).expect("client builds")
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let settings = GraphHopperSettings::default().with_base_url("not a url");
        let err = GraphHopperClient::new(&settings).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = client_for("http://graphhopper.internal:8989//");
        assert_eq!(
            client.route_url().as_str(),
            "http://graphhopper.internal:8989/route"
        );
    }

    #[tokio::test]
    async fn sends_query_parameters_and_decodes_json() {
        let upstream = FakeGraphHopper::json(json!({"paths": []})).spawn().await;
        let client = client_for(&upstream.base_url());

        let payload = client.fetch_route(&query()).await.expect("fetch succeeds");
        assert_eq!(payload, json!({"paths": []}));

        let received = upstream.last_query().expect("query recorded");
        assert_eq!(received.get("point").map(String::as_str), Some("45.5,-73.6"));
        assert_eq!(received.get("profile").map(String::as_str), Some("bike"));
        assert_eq!(received.get("algorithm").map(String::as_str), Some("round_trip"));
        assert_eq!(received.get("ch.disable").map(String::as_str), Some("true"));
        assert_eq!(
            received.get("round_trip.distance").map(String::as_str),
            Some("7500")
        );
        assert_eq!(received.get("points_encoded").map(String::as_str), Some("false"));
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let upstream = FakeGraphHopper::new(400, r#"{"message":"Point 0 is out of bounds"}"#)
            .spawn()
            .await;
        let client = client_for(&upstream.base_url());

        let err = client.fetch_route(&query()).await.unwrap_err();
        assert_eq!(err.kind(), UpstreamErrorKind::UpstreamHttpError);
        assert_eq!(err.status(), Some(400));
        assert!(err.detail().contains("out of bounds"));
    }

    #[tokio::test]
    async fn empty_error_body_gets_generic_detail() {
        let upstream = FakeGraphHopper::new(503, "").spawn().await;
        let client = client_for(&upstream.base_url());

        let err = client.fetch_route(&query()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.detail(), "GraphHopper upstream error");
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let upstream = FakeGraphHopper::new(200, "<html>gateway</html>").spawn().await;
        let client = client_for(&upstream.base_url());

        let err = client.fetch_route(&query()).await.unwrap_err();
        assert_eq!(err.kind(), UpstreamErrorKind::InvalidJson);
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn connection_refused_is_unreachable() {
        let base_url = unused_local_url().await;
        let client = client_for(&base_url);

        let err = client.fetch_route(&query()).await.unwrap_err();
        assert_eq!(err.kind(), UpstreamErrorKind::NetworkUnreachable);
        assert_eq!(err.status(), None);
        assert_eq!(err.detail(), "GraphHopper service unreachable");
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_unreachable() {
        let upstream = FakeGraphHopper::json(json!({"paths": []}))
            .with_delay(Duration::from_secs(2))
            .spawn()
            .await;
        let client = client_for(&upstream.base_url());

        let err = client.fetch_route(&query()).await.unwrap_err();
        assert_eq!(err.kind(), UpstreamErrorKind::NetworkUnreachable);
    }

    #[tokio::test]
    async fn ping_checks_health_endpoint() {
        let healthy = FakeGraphHopper::json(json!({"paths": []})).spawn().await;
        assert!(client_for(&healthy.base_url()).ping().await.is_ok());

        let down = unused_local_url().await;
        assert!(client_for(&down).ping().await.is_err());
    }
}
