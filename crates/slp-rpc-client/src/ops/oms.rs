//! Order management service (OMS).

use serde::Serialize;
use serde_json::Value;

use super::Payload;
use crate::rpc_operation;

/// Create an order group.
///
/// The gateway rewrites numeric point ids to storage ids and converts
/// `deliveryStartAt` to UTC inside `body` before sending.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(flatten)]
    pub body: Payload,
    pub company_id: String,
}
rpc_operation!(OrderCreate => Oms, "order.create", Value);

#[derive(Debug, Clone, Serialize)]
pub struct SecretConfirm {
    #[serde(flatten)]
    pub body: Payload,
}
rpc_operation!(SecretConfirm => Oms, "secret.confirm", Value);

/// Fetch the hand-over secret of an order group.
#[derive(Debug, Clone, Serialize)]
pub struct SecretCode {
    pub id: String,
}
rpc_operation!(SecretCode => Oms, "secret.code", Value);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionChange {
    #[serde(flatten)]
    pub body: Payload,
    pub order_id: String,
}
rpc_operation!(DimensionChange => Oms, "dimension.change", Value);
