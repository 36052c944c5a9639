//! What the courier app shows: the courier's routes with progress counters,
//! and the document summary of one route.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;

const DELIVERED: &str = "DELIVERED";

/// `routes-orders` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierRoutes {
    pub routes: Vec<Value>,
    /// Number of routes. The key keeps the spelling the app reads.
    pub total_docks: usize,
    pub page: u64,
    pub total_orders_count: usize,
}

fn legs_of(route: &Value) -> &[Value] {
    route
        .get("orderDeliveries")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn status_of(leg: &Value) -> Option<&str> {
    leg.get("status").and_then(Value::as_str)
}

fn mile_of(leg: &Value) -> Option<&str> {
    leg.get("mileType").and_then(Value::as_str)
}

/// Add the shift date and order counters to each route.
pub fn board(routes: Vec<Value>, shift_date: Option<DateTime<Utc>>) -> CourierRoutes {
    let total_orders_count = routes.iter().map(|r| legs_of(r).len()).sum();
    let total_docks = routes.len();

    let routes = routes
        .into_iter()
        .map(|mut route| {
            let legs = legs_of(&route);
            let total = legs.len();
            let delivered = legs.iter().filter(|l| status_of(l) == Some(DELIVERED)).count();
            if let Some(map) = route.as_object_mut() {
                map.insert("shiftDate".into(), json!(shift_date));
                map.insert("totalOrders".into(), json!(total));
                map.insert("deliveredOrders".into(), json!(delivered));
            }
            route
        })
        .collect();

    CourierRoutes {
        routes,
        total_docks,
        page: 1,
        total_orders_count,
    }
}

/// `"{all}/{delivered}"` over the legs matching `mile`.
fn progress(legs: &[Value], mile: Option<&str>) -> String {
    let selected: Vec<&Value> = legs
        .iter()
        .filter(|l| mile.map_or(true, |m| mile_of(l) == Some(m)))
        .collect();
    let delivered = selected
        .iter()
        .filter(|l| status_of(l) == Some(DELIVERED))
        .count();
    format!("{}/{}", selected.len(), delivered)
}

/// Add location and progress counters to a route, and the address the
/// courier visits to each leg.
pub fn documents(mut route: Value) -> Value {
    let legs = legs_of(&route).to_vec();
    let locations: std::collections::HashSet<String> = legs
        .iter()
        .map(|l| l.pointer("/order/orderGroupId").map(Value::to_string).unwrap_or_default())
        .collect();

    let legs: Vec<Value> = legs
        .into_iter()
        .map(|mut leg| {
            let street = match mile_of(&leg) {
                Some(slp_core::aggregate::FIRST_MILE) => leg.pointer("/order/sender/street").cloned(),
                Some(slp_core::aggregate::LAST_MILE) => leg.pointer("/order/recipient/street").cloned(),
                _ => None,
            };
            if let (Some(street), Some(map)) = (street, leg.as_object_mut()) {
                map.insert("address".into(), street);
            }
            leg
        })
        .collect();

    if let Some(map) = route.as_object_mut() {
        map.insert("locationCounts".into(), json!(locations.len()));
        map.insert("orderCount".into(), json!(progress(&legs, None)));
        map.insert(
            "take".into(),
            json!(progress(&legs, Some(slp_core::aggregate::FIRST_MILE))),
        );
        map.insert(
            "give".into(),
            json!(progress(&legs, Some(slp_core::aggregate::LAST_MILE))),
        );
        map.insert("orderDeliveries".into(), Value::Array(legs));
    }
    route
}

/// Routes of the courier's vehicle whose status is not in `inactive`.
pub async fn courier_routes(
    pool: &PgPool,
    company_id: Uuid,
    courier_id: Uuid,
    inactive: &[String],
) -> Result<CourierRoutes, AppError> {
    let shift = db::couriers::shift(pool, company_id, courier_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Courier not found"))?;
    let vehicle_id = shift
        .vehicle_id
        .ok_or_else(|| AppError::not_found("Vehicle not found"))?;

    let routes = db::couriers::vehicle_routes(pool, vehicle_id, inactive).await?;
    Ok(board(routes, shift.updated_at))
}

/// Parse the `inactive` filter: comma-separated statuses, blanks dropped.
pub fn parse_statuses(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(status: &str, mile: &str, group: &str) -> Value {
        json!({
            "status": status,
            "mileType": mile,
            "order": {
                "orderGroupId": group,
                "sender": {"street": "Pickup st"},
                "recipient": {"street": "Dropoff st"}
            }
        })
    }

    #[test]
    fn board_counts_orders_per_route() {
        let routes = vec![
            json!({"id": "r1", "orderDeliveries": [
                {"id": "a", "status": "DELIVERED"},
                {"id": "b", "status": "ROUTED"}
            ]}),
            json!({"id": "r2", "orderDeliveries": []}),
        ];
        let out = board(routes, None);
        assert_eq!(out.total_docks, 2);
        assert_eq!(out.total_orders_count, 2);
        assert_eq!(out.page, 1);
        assert_eq!(out.routes[0]["totalOrders"], 2);
        assert_eq!(out.routes[0]["deliveredOrders"], 1);
        assert_eq!(out.routes[1]["totalOrders"], 0);
        assert!(out.routes[0]["shiftDate"].is_null());

        let wire = serde_json::to_value(&out).unwrap();
        assert_eq!(wire["totalDocks"], 2);
        assert_eq!(wire["totalOrdersCount"], 2);
    }

    #[test]
    fn documents_summarize_progress_and_addresses() {
        let route = json!({
            "id": "r1",
            "orderDeliveries": [
                leg("DELIVERED", "FIRST_MILE", "g1"),
                leg("ROUTED", "FIRST_MILE", "g1"),
                leg("DELIVERED", "LAST_MILE", "g2"),
            ]
        });
        let out = documents(route);
        assert_eq!(out["locationCounts"], 2);
        assert_eq!(out["orderCount"], "3/2");
        assert_eq!(out["take"], "2/1");
        assert_eq!(out["give"], "1/1");
        assert_eq!(out["orderDeliveries"][0]["address"], "Pickup st");
        assert_eq!(out["orderDeliveries"][2]["address"], "Dropoff st");
    }

    #[test]
    fn inactive_statuses_are_split() {
        assert_eq!(
            parse_statuses(Some("DELIVERED, ROUTED,,")),
            vec!["DELIVERED".to_string(), "ROUTED".to_string()]
        );
        assert!(parse_statuses(None).is_empty());
    }
}
