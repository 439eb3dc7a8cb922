//! Validation and flattening of GraphHopper route responses.
//!
//! GraphHopper answers with either an explicit coordinate list or an encoded
//! polyline depending on `points_encoded`. Only the first entry of `paths` is
//! used; the engine orders paths itself and the first is authoritative.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::UpstreamError;

pub const MISSING_PATHS: &str = "missing paths";
pub const MISSING_PATH_DATA: &str = "missing path data";
pub const MISSING_POINTS: &str = "missing points";
pub const UNEXPECTED_ENCODED_STRING: &str = "expected coordinates but got encoded string";
pub const MISSING_COORDINATES: &str = "missing coordinates";

/// Route geometry in the form the caller asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RouteGeometry {
    /// Ordered `[lon, lat]` pairs (possibly with elevation).
    #[serde(rename = "coordinates")]
    Coordinates(Vec<Value>),
    /// Encoded polyline, passed through untouched for the client to decode.
    #[serde(rename = "points")]
    Encoded(Value),
}

impl RouteGeometry {
    /// The geometry on its own, as served by the legacy endpoint.
    pub fn into_value(self) -> Value {
        match self {
            RouteGeometry::Coordinates(coordinates) => Value::Array(coordinates),
            RouteGeometry::Encoded(points) => points,
        }
    }
}

/// Normalized route summary returned to clients.
///
/// Metadata fields are raw JSON so numbers keep the exact representation
/// GraphHopper used; absent fields become `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRoute {
    #[serde(flatten)]
    pub geometry: RouteGeometry,
    pub distance_meters: Value,
    pub duration_ms: Value,
    pub bbox: Value,
    pub ascend: Value,
    pub descend: Value,
}

/// Validate `response` and extract the first path.
pub fn normalize(
    response: &Value,
    points_encoded: bool,
) -> Result<NormalizedRoute, UpstreamError> {
    let path = first_path(response)?;

    let points = path
        .get("points")
        .filter(|points| is_present(points))
        .ok_or_else(|| shape_error(MISSING_POINTS))?;

    let geometry = if points_encoded {
        RouteGeometry::Encoded(points.clone())
    } else {
        if points.is_string() {
            return Err(shape_error(UNEXPECTED_ENCODED_STRING));
        }
        let coordinates = points
            .get("coordinates")
            .and_then(Value::as_array)
            .ok_or_else(|| shape_error(MISSING_COORDINATES))?;
        RouteGeometry::Coordinates(coordinates.clone())
    };

    Ok(NormalizedRoute {
        geometry,
        distance_meters: field(path, "distance"),
        duration_ms: field(path, "time"),
        bbox: field(path, "bbox"),
        ascend: field(path, "ascend"),
        descend: field(path, "descend"),
    })
}

fn first_path(response: &Value) -> Result<&serde_json::Map<String, Value>, UpstreamError> {
    let first = response
        .get("paths")
        .and_then(Value::as_array)
        .and_then(|paths| paths.first())
        .ok_or_else(|| shape_error(MISSING_PATHS))?;

    first
        .as_object()
        .filter(|path| !path.is_empty())
        .ok_or_else(|| shape_error(MISSING_PATH_DATA))
}

fn field(path: &serde_json::Map<String, Value>, key: &str) -> Value {
    path.get(key).cloned().unwrap_or(Value::Null)
}

/// JSON truthiness: null, false, zero, and empty strings, arrays, or objects
/// count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn shape_error(detail: &str) -> UpstreamError {
    warn!(detail, "GraphHopper response failed shape validation");
    UpstreamError::invalid_shape(detail)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn detail_of(result: Result<NormalizedRoute, UpstreamError>) -> String {
        result.unwrap_err().detail().to_string()
    }

    #[test]
    fn coordinates_and_metadata_are_extracted() {
        let response = json!({
            "paths": [{
                "points": {"type": "LineString", "coordinates": [[1, 2], [3, 4]]},
                "distance": 1000,
                "time": 60000,
                "bbox": [1, 2, 3, 4],
                "ascend": 12.5,
                "descend": 11.0
            }]
        });

        let route = normalize(&response, false).expect("valid response");
        assert_eq!(
            route.geometry,
            RouteGeometry::Coordinates(vec![json!([1, 2]), json!([3, 4])])
        );
        assert_eq!(route.distance_meters, json!(1000));
        assert_eq!(route.duration_ms, json!(60000));
        assert_eq!(route.bbox, json!([1, 2, 3, 4]));
        assert_eq!(route.ascend, json!(12.5));
    }

    #[test]
    fn absent_metadata_becomes_null() {
        let response = json!({"paths": [{"points": {"coordinates": [[1, 2]]}}]});
        let route = normalize(&response, false).expect("valid response");

        assert_eq!(route.distance_meters, Value::Null);
        assert_eq!(route.bbox, Value::Null);
        assert_eq!(route.descend, Value::Null);
    }

    #[test]
    fn encoded_points_pass_through_verbatim() {
        let response = json!({"paths": [{"points": "_p~iF~ps|U_ulLnnqC", "distance": 5.5}]});
        let route = normalize(&response, true).expect("valid response");

        assert_eq!(route.geometry, RouteGeometry::Encoded(json!("_p~iF~ps|U_ulLnnqC")));
        assert_eq!(route.distance_meters, json!(5.5));
    }

    #[test]
    fn missing_or_empty_paths() {
        assert_eq!(detail_of(normalize(&json!({}), false)), MISSING_PATHS);
        assert_eq!(detail_of(normalize(&json!({"paths": []}), false)), MISSING_PATHS);
        assert_eq!(detail_of(normalize(&json!({"paths": "x"}), false)), MISSING_PATHS);
        assert_eq!(detail_of(normalize(&json!([1, 2]), false)), MISSING_PATHS);
    }

    #[test]
    fn first_path_must_be_an_object() {
        assert_eq!(
            detail_of(normalize(&json!({"paths": ["route"]}), false)),
            MISSING_PATH_DATA
        );
        assert_eq!(
            detail_of(normalize(&json!({"paths": [{}]}), true)),
            MISSING_PATH_DATA
        );
    }

    #[test]
    fn falsy_points_are_missing() {
        for points in [json!(null), json!(""), json!([]), json!({}), json!(0), json!(false)] {
            let response = json!({"paths": [{"points": points, "distance": 1}]});
            assert_eq!(detail_of(normalize(&response, false)), MISSING_POINTS);
            assert_eq!(detail_of(normalize(&response, true)), MISSING_POINTS);
        }
    }

    #[test]
    fn encoded_string_when_coordinates_requested() {
        let response = json!({"paths": [{"points": "encodedstring"}]});
        assert_eq!(
            detail_of(normalize(&response, false)),
            UNEXPECTED_ENCODED_STRING
        );
    }

    #[test]
    fn coordinates_must_be_a_sequence() {
        let no_coordinates = json!({"paths": [{"points": {"type": "LineString"}}]});
        let wrong_type = json!({"paths": [{"points": {"coordinates": "1,2"}}]});
        let bare_list = json!({"paths": [{"points": [[1, 2]]}]});

        assert_eq!(detail_of(normalize(&no_coordinates, false)), MISSING_COORDINATES);
        assert_eq!(detail_of(normalize(&wrong_type, false)), MISSING_COORDINATES);
        assert_eq!(detail_of(normalize(&bare_list, false)), MISSING_COORDINATES);
    }

    #[test]
    fn only_first_path_is_used() {
        let response = json!({
            "paths": [
                {"points": {"coordinates": [[1, 1]]}, "distance": 10},
                {"points": {"coordinates": [[2, 2]]}, "distance": 5}
            ]
        });
        let route = normalize(&response, false).expect("valid response");
        assert_eq!(route.distance_meters, json!(10));
    }

    #[test]
    fn serialized_shape_puts_geometry_first() {
        let response = json!({
            "paths": [{"points": {"coordinates": [[1, 2], [3, 4]]}, "distance": 1000, "time": 60000}]
        });
        let route = normalize(&response, false).expect("valid response");

        assert_eq!(
            serde_json::to_string(&route).unwrap(),
            r#"{"coordinates":[[1,2],[3,4]],"distance_meters":1000,"duration_ms":60000,"bbox":null,"ascend":null,"descend":null}"#
        );
    }

    #[test]
    fn legacy_value_is_bare_geometry() {
        let coordinates = RouteGeometry::Coordinates(vec![json!([1, 2])]);
        assert_eq!(coordinates.into_value(), json!([[1, 2]]));

        let encoded = RouteGeometry::Encoded(json!("abc"));
        assert_eq!(encoded.into_value(), json!("abc"));
    }
}
