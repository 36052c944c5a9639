//! # Orders
//!
//! Order table and lookups are read from the database; every state change
//! goes to the service that owns it.
//!
//! | Method | Path (under `/companies/:company_id/orders`) | Backend              |
//! |--------|-----------------------------------------------|----------------------|
//! | GET    | `/`                                           | table read           |
//! | POST   | `/`                                           | `oms order.create`   |
//! | POST   | `/confirm`                                    | `oms secret.confirm` |
//! | GET    | `/external/:order_number`                     | read                 |
//! | GET    | `/code/:code`                                 | read                 |
//! | GET    | `/:order_id`                                  | read                 |
//! | GET    | `/:order_id/properties`                       | read                 |
//! | POST   | `/:order_id/give`                             | `wms order.give`     |
//! | POST   | `/:order_id/set-code`                         | `wms order.set-code` |
//! | POST   | `/:order_id/cancel`                           | `tms order.cancel`   |
//! | PUT    | `/:order_id/dimensions`                       | `oms dimension.change` |
//! | GET    | `/:order_id/secretCode`                       | `oms secret.code` (id is the order group) |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use slp_core::{FieldDescriptor, FieldType, Record, ResponseEnvelope};
use slp_rpc_client::ops::{oms, tms, wms};
use uuid::Uuid;

use super::{forward, parse_number, relay, table_page, JsonBody};
use crate::auth::{require_any_role, Caller, Role};
use crate::db;
use crate::db::catalog::{Introspector, Relation};
use crate::db::orders::OrderFilter;
use crate::error::AppError;
use crate::extractors::{extract_json, parse_datetime, ApiPath, ApiQuery, Ctx, PageParams, TimeZone};
use crate::services::order_intake;
use crate::state::AppState;

pub(crate) const ORDER_EXCLUDES: &[&str] = &["cell_code"];
pub(crate) const SENDER_EXCLUDES: &[&str] = &["working_days"];
pub(crate) const POOL_EXCLUDES: &[&str] = &[
    "id",
    "company_id",
    "storage_id",
    "created_at",
    "updated_at",
];

/// Keys kept nested when an order row is flattened.
pub(crate) const ORDER_ROW_KEEP: &[&str] = &["dimensions", "deliveryStartAt", "createdAt", "updatedAt"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/orders",
            get(list_orders).post(create_order),
        )
        .route("/companies/:company_id/orders/confirm", post(confirm))
        .route(
            "/companies/:company_id/orders/external/:order_number",
            get(by_external_number),
        )
        .route("/companies/:company_id/orders/code/:code", get(by_code))
        .route("/companies/:company_id/orders/:order_id", get(detail))
        .route(
            "/companies/:company_id/orders/:order_id/properties",
            get(properties),
        )
        .route("/companies/:company_id/orders/:order_id/give", post(give))
        .route(
            "/companies/:company_id/orders/:order_id/set-code",
            post(set_code),
        )
        .route("/companies/:company_id/orders/:order_id/cancel", post(cancel))
        .route(
            "/companies/:company_id/orders/:order_id/dimensions",
            put(change_dimensions),
        )
        .route(
            "/companies/:company_id/orders/:order_id/secretCode",
            get(secret_code),
        )
}

/// Descriptors of an order row joined with sender, recipient and pool.
pub(crate) async fn order_fields(catalog: &Introspector) -> Result<Vec<FieldDescriptor>, AppError> {
    let relation = Relation::root("order", ORDER_EXCLUDES)
        .join(Relation::nested("sender", "sender", SENDER_EXCLUDES))
        .join(Relation::nested("recipient", "recipient", &[]))
        .join(Relation::nested("pool", "pool", POOL_EXCLUDES));
    Ok(catalog.describe_joined(&relation).await?)
}

// ── Reads ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderQuery {
    status: Option<String>,
    external_number: Option<String>,
    number: Option<String>,
    pool_number: Option<String>,
    sender_dc_id: Option<Uuid>,
    recipient_dc_id: Option<Uuid>,
    from: Option<String>,
    to: Option<String>,
}

impl OrderQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        Ok(OrderFilter {
            number: parse_number("number", self.number.as_deref())?,
            pool_number: parse_number("poolNumber", self.pool_number.as_deref())?,
            from: parse_datetime("from", self.from.as_deref())?,
            to: parse_datetime("to", self.to.as_deref())?,
            status: self.status.filter(|s| !s.is_empty()),
            external_number: self.external_number.filter(|s| !s.is_empty()),
            sender_dc_id: self.sender_dc_id,
            recipient_dc_id: self.recipient_dc_id,
        })
    }
}

async fn list_orders(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<OrderQuery>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let filter = query.into_filter()?;
    let pool = state.db()?;

    let descriptor = paging.paginate(db::orders::count(pool, company_id, &filter).await?);
    let rows = db::orders::list(
        pool,
        company_id,
        &filter,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;

    let mut fields = order_fields(state.catalog()?).await?;
    fields.push(FieldDescriptor::synthetic("routeNumber", FieldType::String, false));

    Ok(Json(table_page(rows, ORDER_ROW_KEEP, fields, &descriptor)))
}

/// Order with sender, recipient and dimension. `senderName` is the name the
/// recipient DC prints on labels.
async fn detail(
    State(state): State<AppState>,
    ApiPath((company_id, order_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Record<Value>>, AppError> {
    let pool = state.db()?;
    let mut order = db::orders::detail(pool, company_id, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let dc_id = order
        .pointer("/recipient/dcId")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::not_found("Storage not found"))?;
    let name = db::storages::name(pool, dc_id)
        .await?
        .ok_or_else(|| AppError::not_found("Storage not found"))?;

    if let Some(map) = order.as_object_mut() {
        map.insert("senderName".into(), Value::String(format!("Sello {name}")));
    }
    Ok(Json(Record::new(order)))
}

async fn by_external_number(
    State(state): State<AppState>,
    ApiPath((company_id, order_number)): ApiPath<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    let order = db::orders::by_external_number(state.db()?, company_id, &order_number)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(order))
}

async fn by_code(
    State(state): State<AppState>,
    ApiPath((company_id, code)): ApiPath<(Uuid, String)>,
) -> Result<Json<Record<Value>>, AppError> {
    let order = db::orders::by_code(state.db()?, company_id, &code)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(Record::new(order)))
}

async fn properties(
    State(state): State<AppState>,
    ApiPath((company_id, order_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let properties = db::orders::properties(state.db()?, company_id, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(json!({ "properties": properties })))
}

// ── Writes ──────────────────────────────────────────────────────────────────

/// Legacy numeric point ids are swapped for storage ids and a local
/// `deliveryStartAt` is moved to UTC before the order service sees them.
async fn create_order(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    TimeZone(tz): TimeZone,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::OrderCreate, Role::OrderManagement])?;
    let mut body = extract_json(body)?;
    let rpc = state.rpc()?;
    let pool = state.db()?;

    order_intake::resolve_point_ids(pool, &mut body).await?;
    order_intake::delivery_start_to_utc(pool, &mut body, &tz).await?;

    let op = oms::OrderCreate {
        body,
        company_id: company_id.to_string(),
    };
    rpc.send(&ctx, &op).await?;
    tracing::info!(company_id = %company_id, "order forwarded for creation");
    Ok(StatusCode::NO_CONTENT)
}

async fn confirm(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    forward(&state, &ctx, &oms::SecretConfirm { body }).await
}

async fn give(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, order_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::OrderGive {
        body,
        order_id: order_id.to_string(),
        dc_id: None,
        user_id: caller.sub,
    };
    forward(&state, &ctx, &op).await
}

async fn set_code(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, order_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::OrderSetCode {
        body,
        order_id: order_id.to_string(),
        storage_id: None,
        user_id: caller.sub,
    };
    forward(&state, &ctx, &op).await
}

async fn cancel(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, order_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let op = tms::OrderCancel {
        id: order_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn change_dimensions(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, order_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = oms::DimensionChange {
        body,
        order_id: order_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn secret_code(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, group_id)): ApiPath<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    relay(&state, &ctx, &oms::SecretCode { id: group_id }).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_becomes_filter() {
        let query = OrderQuery {
            status: Some("NEW".into()),
            external_number: Some(String::new()),
            number: Some("12".into()),
            from: Some("2024-01-01".into()),
            ..OrderQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.status.as_deref(), Some("NEW"));
        assert_eq!(filter.external_number, None);
        assert_eq!(filter.number, Some(12));
        assert!(filter.from.is_some());
        assert!(filter.to.is_none());
    }

    #[test]
    fn bad_pool_number_is_400() {
        let query = OrderQuery {
            pool_number: Some("seven".into()),
            ..OrderQuery::default()
        };
        let err = query.into_filter().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
