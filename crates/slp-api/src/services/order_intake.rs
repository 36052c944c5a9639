//! Preparation of an order-creation payload before it goes to the order
//! service.
//!
//! Partner integrations address pick-up points by their numeric legacy id.
//! Those ids are resolved to storage ids through `sello_point`; UUIDs pass
//! through untouched. `deliveryStartAt` arrives as wall-clock time in the
//! caller's zone and leaves as a UTC instant.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use slp_rpc_client::ops::Payload;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;

/// Numeric legacy point id, if `value` is one.
pub fn legacy_point_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || Uuid::parse_str(s).is_ok() {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

/// Mutable references to every `pointId` that may need resolving: the
/// recipient's and each order's sender's.
fn point_ids(body: &mut Payload) -> Vec<&mut Value> {
    let mut out = Vec::new();
    for (key, value) in body.iter_mut() {
        match (key.as_str(), value) {
            ("recipient", recipient) => out.extend(recipient.get_mut("pointId")),
            ("orders", Value::Array(orders)) => {
                for order in orders {
                    out.extend(order.get_mut("sender").and_then(|s| s.get_mut("pointId")));
                }
            }
            _ => {}
        }
    }
    out
}

/// Replace every legacy point id with the id of its storage.
pub async fn resolve_point_ids(pool: &PgPool, body: &mut Payload) -> Result<(), AppError> {
    for slot in point_ids(body) {
        let Some(legacy) = legacy_point_id(slot) else {
            continue;
        };
        let storage = db::orders::storage_for_point(pool, legacy)
            .await?
            .ok_or_else(|| AppError::not_found("Storage not found"))?;
        *slot = Value::String(storage.to_string());
    }
    Ok(())
}

/// Convert `deliveryStartAt` from the caller's zone to UTC. Values with an
/// explicit offset already name an instant and are only normalized.
pub async fn delivery_start_to_utc(
    pool: &PgPool,
    body: &mut Payload,
    tz: &str,
) -> Result<(), AppError> {
    let Some(raw) = body.get("deliveryStartAt").and_then(Value::as_str) else {
        return Ok(());
    };

    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else {
        let local = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|_| AppError::bad_request(format!("deliveryStartAt must be a date, got '{raw}'")))?;
        if !db::time::zone_exists(pool, tz).await? {
            return Err(AppError::bad_request(format!("unknown time zone '{tz}'")));
        }
        db::time::timestamp_to_utc(pool, local, tz).await?
    };

    body.insert("deliveryStartAt".into(), Value::String(utc.to_rfc3339()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_ids_are_numeric_and_not_uuids() {
        assert_eq!(legacy_point_id(&json!(42)), Some(42));
        assert_eq!(legacy_point_id(&json!("17")), Some(17));
        assert_eq!(legacy_point_id(&json!(" 8 ")), Some(8));
        assert_eq!(legacy_point_id(&json!("")), None);
        assert_eq!(legacy_point_id(&json!("6f1c2b7e-8a4d-4d8e-9c1a-2b3c4d5e6f70")), None);
        assert_eq!(legacy_point_id(&json!("PUP-1")), None);
        assert_eq!(legacy_point_id(&json!(null)), None);
        assert_eq!(legacy_point_id(&json!(1.5)), None);
    }

    #[test]
    fn point_ids_cover_recipient_and_every_sender() {
        let mut body: Payload = serde_json::from_value(json!({
            "recipient": {"pointId": "3"},
            "orders": [
                {"sender": {"pointId": 5}},
                {"sender": {"name": "no point"}},
                {"sender": {"pointId": "6f1c2b7e-8a4d-4d8e-9c1a-2b3c4d5e6f70"}}
            ]
        }))
        .unwrap();

        let ids: Vec<Value> = point_ids(&mut body).into_iter().map(|v| v.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&json!("3")));
        assert!(ids.contains(&json!(5)));
        assert!(ids.contains(&json!("6f1c2b7e-8a4d-4d8e-9c1a-2b3c4d5e6f70")));
    }

    #[test]
    fn point_ids_tolerate_missing_sections() {
        let mut body = Payload::new();
        assert!(point_ids(&mut body).is_empty());
    }
}
