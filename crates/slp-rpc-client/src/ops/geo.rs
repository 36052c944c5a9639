//! Geography service: places, point-in-zone and reverse geocoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

/// Places (zone polygons) by id, scoped to a company group.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceList {
    pub ids: Vec<String>,
    pub group_id: String,
}
rpc_operation!(PlaceList => Geo, "place.list", Vec<Place>);

/// A stored place with its geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Value,
}

/// Does a point lie inside the zone's polygon?
#[derive(Debug, Clone, Serialize)]
pub struct PointInZone {
    pub geo_id: String,
    pub latitude: f64,
    pub longitude: f64,
}
rpc_operation!(PointInZone => Geo, "zone.point-in", PointInZoneResult);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInZoneResult {
    #[serde(default)]
    pub in_zone: bool,
}

/// Reverse geocode a point in the caller's language.
#[derive(Debug, Clone, Serialize)]
pub struct AddressByPoint {
    #[serde(flatten)]
    pub body: Payload,
    pub lang: String,
}
rpc_operation!(AddressByPoint => Geo, "place.address-by-point", Value);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn place_parses_geometry() {
        let place: Place = serde_json::from_value(json!({
            "id": "g1",
            "geometry": {"type": "Polygon", "coordinates": [[[1.0, 2.0]]]},
            "extra": true
        }))
        .unwrap();
        let geometry = place.geometry.unwrap();
        assert_eq!(geometry.geometry_type, "Polygon");
        assert_eq!(geometry.coordinates, json!([[[1.0, 2.0]]]));
    }

    #[test]
    fn point_in_zone_result_defaults_to_outside() {
        let r: PointInZoneResult = serde_json::from_value(json!({})).unwrap();
        assert!(!r.in_zone);
        let r: PointInZoneResult = serde_json::from_value(json!({"inZone": true})).unwrap();
        assert!(r.in_zone);
    }

    #[test]
    fn point_in_zone_payload_is_snake_case() {
        let op = PointInZone {
            geo_id: "g1".into(),
            latitude: 41.3,
            longitude: 69.2,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"geo_id": "g1", "latitude": 41.3, "longitude": 69.2})
        );
    }
}
