//! Transport management service (TMS).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

// -- Companies ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(CompanyUpdate => Tms, "company.update", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettingsUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(CompanySettingsUpdate => Tms, "company-settings.update", Value);

// -- Routes ------------------------------------------------------------------

/// Create a route from a pool.
#[derive(Debug, Clone, Serialize)]
pub struct RouteCreate {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(RouteCreate => Tms, "route.create", Value);

/// Move a route's legs back into an active pool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMoveToPool {
    #[serde(flatten)]
    pub body: Payload,
    pub route_id: String,
}
rpc_operation!(RouteMoveToPool => Tms, "route.move-to-pool", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUnpaid {
    pub route_id: String,
}
rpc_operation!(RouteUnpaid => Tms, "route.unpaid", Value);

/// Route status values set by courier actions.
pub const ROUTE_STATUS_COURIER_ON_WAY: &str = "COURIER_ON_WAY";

#[derive(Debug, Clone, Serialize)]
pub struct RouteCourierOnWay {
    pub id: String,
    pub status: String,
}

impl RouteCourierOnWay {
    pub fn new(route_id: impl Into<String>) -> Self {
        Self {
            id: route_id.into(),
            status: ROUTE_STATUS_COURIER_ON_WAY.into(),
        }
    }
}
rpc_operation!(RouteCourierOnWay => Tms, "route.courier-on-way", Value);

#[derive(Debug, Clone, Serialize)]
pub struct RouteCourierAccepted {
    pub id: String,
}
rpc_operation!(RouteCourierAccepted => Tms, "route.courier-accepted", Value);

// -- Pools and order deliveries ---------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMoveToRoute {
    #[serde(flatten)]
    pub body: Payload,
    pub pool_id: String,
}
rpc_operation!(PoolMoveToRoute => Tms, "pool.move-to-route", Value);

/// Move one leg from a pool to another.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeliveryUpdatePool {
    pub old_pool_id: String,
    pub delivery_order_id: String,
    pub new_pool_id: String,
}
rpc_operation!(OrderDeliveryUpdatePool => Tms, "order-delivery.update-pool", Value);

/// Courier scanned the parcel's QR code.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDeliveryCourierTook {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(OrderDeliveryCourierTook => Tms, "order-delivery.courier-took", Value);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeliveryCourierOnPoint {
    pub ids: Vec<String>,
}
rpc_operation!(OrderDeliveryCourierOnPoint => Tms, "order-delivery.courier-on-point", Value);

#[derive(Debug, Clone, Serialize)]
pub struct OrderDeliveryDelivered {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(OrderDeliveryDelivered => Tms, "order-delivery.delivered", Value);

#[derive(Debug, Clone, Serialize)]
pub struct OrderCancel {
    pub id: String,
}
rpc_operation!(OrderCancel => Tms, "order.cancel", Value);

// -- Zones -------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(ZoneCreate => Tms, "zone.create", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
    pub company_id: String,
}
rpc_operation!(ZoneUpdate => Tms, "zone.update", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDelete {
    pub id: String,
    pub company_id: String,
}
rpc_operation!(ZoneDelete => Tms, "zone.delete", Value);

/// Which zone (if any) covers a point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCheckPoint {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(ZoneCheckPoint => Tms, "zone.check-point", Value);

// -- Tariffs -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(TariffCreate => Tms, "tariff.create", Value);

#[derive(Debug, Clone, Serialize)]
pub struct TariffUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
}
rpc_operation!(TariffUpdate => Tms, "tariff.update", Value);

#[derive(Debug, Clone, Serialize)]
pub struct TariffDelete {
    pub id: String,
}
rpc_operation!(TariffDelete => Tms, "tariff.delete", Value);

// -- Route planners ----------------------------------------------------------

/// `start_time` is `HH:MM` in UTC; the gateway converts it from the
/// caller's time zone before sending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlannerCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
    pub start_time: String,
}
rpc_operation!(RoutePlannerCreate => Tms, "route-planner.create", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlannerUpdate {
    #[serde(flatten)]
    pub body: Payload,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}
rpc_operation!(RoutePlannerUpdate => Tms, "route-planner.update", Value);

#[derive(Debug, Clone, Serialize)]
pub struct RoutePlannerDelete {
    pub id: String,
}
rpc_operation!(RoutePlannerDelete => Tms, "route-planner.delete", Value);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{RpcOperation, Service};
    use serde_json::json;

    #[test]
    fn update_pool_uses_backend_key_names() {
        let op = OrderDeliveryUpdatePool {
            old_pool_id: "p1".into(),
            delivery_order_id: "od1".into(),
            new_pool_id: "p2".into(),
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"oldPoolId": "p1", "deliveryOrderId": "od1", "newPoolId": "p2"})
        );
        assert_eq!(OrderDeliveryUpdatePool::SERVICE, Service::Tms);
        assert_eq!(OrderDeliveryUpdatePool::PATTERN, "order-delivery.update-pool");
    }

    #[test]
    fn courier_on_way_sets_status() {
        let v = serde_json::to_value(RouteCourierOnWay::new("r1")).unwrap();
        assert_eq!(v, json!({"id": "r1", "status": "COURIER_ON_WAY"}));
    }

    #[test]
    fn planner_update_omits_missing_start_time() {
        let op = RoutePlannerUpdate {
            body: Payload::new(),
            id: "rp".into(),
            start_time: None,
        };
        assert_eq!(serde_json::to_value(&op).unwrap(), json!({"id": "rp"}));
    }
}
