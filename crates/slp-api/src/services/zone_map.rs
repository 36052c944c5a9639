//! Zones drawn on the dispatcher's map: each zone with its polygon from the
//! geo service and the storage placed in it.

use serde_json::{json, Value};
use slp_rpc_client::ops::geo::{Place, PlaceList};
use slp_rpc_client::{RequestContext, RpcClient};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;

fn str_field<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str)
}

/// Join zones with their place geometry and storage. Zones whose place is
/// unknown to the geo service are left out.
pub fn merge(zones: Vec<Value>, places: &[Place], storages: &[Value]) -> Vec<Value> {
    zones
        .into_iter()
        .filter_map(|zone| {
            let geo_id = str_field(&zone, "geoId")?;
            let place = places.iter().find(|p| p.id == geo_id)?;
            let zone_id = str_field(&zone, "id");
            let storage = storages
                .iter()
                .find(|s| zone_id.is_some() && str_field(s, "zoneId") == zone_id);
            let field = |key: &str| storage.and_then(|s| s.get(key)).cloned().unwrap_or(Value::Null);

            Some(json!({
                "id": zone.get("id"),
                "name": zone.get("name"),
                "companyId": zone.get("companyId"),
                "geoId": geo_id,
                "storage": {
                    "id": field("id"),
                    "code": field("code"),
                    "status": field("status"),
                    "coordinate": {
                        "latitude": field("latitude"),
                        "longitude": field("longitude"),
                    },
                    "pointType": field("type"),
                },
                "geometry": place.geometry,
                "createdAt": zone.get("createdAt"),
                "updatedAt": zone.get("updatedAt"),
            }))
        })
        .collect()
}

/// Zones of a company merged with geometry. A failing geo call yields no
/// zones rather than an error.
pub async fn zone_map(
    pool: &PgPool,
    rpc: &RpcClient,
    ctx: &RequestContext,
    company_id: Uuid,
) -> Result<Vec<Value>, AppError> {
    let zones = db::zones::list(pool, company_id).await?;
    let request = PlaceList {
        ids: zones
            .iter()
            .filter_map(|z| str_field(z, "geoId").map(str::to_string))
            .collect(),
        group_id: company_id.to_string(),
    };

    let places = match rpc.send(ctx, &request).await {
        Ok(places) => places,
        Err(e) => {
            tracing::warn!(error = %e, "place list failed, returning no zones");
            return Ok(Vec::new());
        }
    };

    let zone_ids: Vec<Uuid> = zones
        .iter()
        .filter_map(|z| str_field(z, "id").and_then(|id| Uuid::parse_str(id).ok()))
        .collect();
    let storages = db::zones::storages_in(pool, &zone_ids).await?;

    Ok(merge(zones, &places, &storages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slp_rpc_client::ops::geo::Geometry;

    #[test]
    fn zones_are_joined_with_place_and_storage() {
        let zones = vec![
            json!({"id": "z1", "name": "North", "companyId": "c1", "geoId": "g1"}),
            json!({"id": "z2", "name": "Lost", "companyId": "c1", "geoId": "g-missing"}),
        ];
        let places = vec![Place {
            id: "g1".into(),
            geometry: Some(Geometry {
                geometry_type: "Polygon".into(),
                coordinates: json!([[[1.0, 2.0]]]),
            }),
        }];
        let storages = vec![json!({
            "id": "s1", "zoneId": "z1", "code": "DC-1", "status": "ACTIVE",
            "latitude": 41.3, "longitude": 69.2, "type": "DC"
        })];

        let merged = merge(zones, &places, &storages);
        assert_eq!(merged.len(), 1);
        let zone = &merged[0];
        assert_eq!(zone["id"], "z1");
        assert_eq!(zone["geometry"]["type"], "Polygon");
        assert_eq!(zone["storage"]["code"], "DC-1");
        assert_eq!(zone["storage"]["coordinate"]["latitude"], 41.3);
        assert_eq!(zone["storage"]["pointType"], "DC");
    }

    #[test]
    fn zone_without_storage_has_empty_storage() {
        let zones = vec![json!({"id": "z1", "geoId": "g1"})];
        let places = vec![Place {
            id: "g1".into(),
            geometry: None,
        }];
        let merged = merge(zones, &places, &[]);
        assert!(merged[0]["storage"]["id"].is_null());
        assert!(merged[0]["geometry"].is_null());
    }
}
