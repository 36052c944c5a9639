//! Warehouse management service (WMS).

use serde::Serialize;
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

/// Register a DC or PUP. `tz` is the caller's IANA time zone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
    pub tz: String,
}
rpc_operation!(StorageCreate => Wms, "storage.create", Value);

/// Hand an order over to its recipient or courier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGive {
    #[serde(flatten)]
    pub body: Payload,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
rpc_operation!(OrderGive => Wms, "order.give", Value);

/// Attach a cell code to an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSetCode {
    #[serde(flatten)]
    pub body: Payload,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
rpc_operation!(OrderSetCode => Wms, "order.set-code", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceive {
    #[serde(flatten)]
    pub body: Payload,
    pub storage_id: String,
    pub user_id: String,
}
rpc_operation!(OrderReceive => Wms, "order.receive", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteClose {
    #[serde(flatten)]
    pub body: Payload,
    pub storage_id: String,
    pub user_id: String,
}
rpc_operation!(RouteClose => Wms, "route.close", Value);
