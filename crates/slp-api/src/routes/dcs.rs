//! # Storages: Distribution Centers and Pickup Points
//!
//! | Method | Path (under `/companies/:company_id/dcs`) | Backend             |
//! |--------|--------------------------------------------|---------------------|
//! | GET    | `/`                                        | read                |
//! | POST   | `/`                                        | `wms storage.create` |
//! | GET    | `/:dc_id`                                  | read                |
//! | GET    | `/:dc_id/orders`                           | table read          |
//! | POST   | `/:dc_id/receive-order`                    | `wms order.receive` |
//! | PUT    | `/:dc_id/routes/close`                     | `wms route.close`   |
//! | POST   | `/:dc_id/orders/:order_id`                 | `wms order.set-code` |
//! | POST   | `/:dc_id/orders/:order_id/give`            | `wms order.give`    |
//!
//! A storage is created only inside an existing zone, at a point the geo
//! service places within that zone. A pickup point also needs a DC already
//! serving the zone.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::geo::PointInZone;
use slp_rpc_client::ops::{wms, Payload};
use slp_rpc_client::RequestContext;
use uuid::Uuid;

use super::orders::{order_fields, ORDER_ROW_KEEP};
use super::{body_uuid, forward, table_page, JsonBody};
use crate::auth::{require_any_role, Caller, Role};
use crate::db;
use crate::db::storages::TYPE_PUP;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx, PageParams, TimeZone};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/dcs",
            get(list_storages).post(create_storage),
        )
        .route("/companies/:company_id/dcs/:dc_id", get(get_storage))
        .route("/companies/:company_id/dcs/:dc_id/orders", get(self_delivery_orders))
        .route(
            "/companies/:company_id/dcs/:dc_id/receive-order",
            post(receive_order),
        )
        .route("/companies/:company_id/dcs/:dc_id/routes/close", put(close_route))
        .route(
            "/companies/:company_id/dcs/:dc_id/orders/:order_id",
            post(set_code),
        )
        .route(
            "/companies/:company_id/dcs/:dc_id/orders/:order_id/give",
            post(give),
        )
}

// ── Reads ───────────────────────────────────────────────────────────────────

async fn list_storages(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::storages::list(state.db()?, company_id).await?))
}

async fn get_storage(
    State(state): State<AppState>,
    ApiPath((company_id, dc_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let storage = db::storages::get(state.db()?, company_id, dc_id)
        .await?
        .ok_or_else(|| AppError::not_found("Storage not found"))?;
    Ok(Json(storage))
}

/// Orders waiting at the storage for the customer to pick them up.
async fn self_delivery_orders(
    State(state): State<AppState>,
    ApiPath((company_id, dc_id)): ApiPath<(Uuid, Uuid)>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;
    if db::storages::get(pool, company_id, dc_id).await?.is_none() {
        return Err(AppError::not_found("Storage not found"));
    }

    let descriptor = paging.paginate(db::orders::count_self_delivery(pool, dc_id).await?);
    let rows = db::orders::list_self_delivery(
        pool,
        dc_id,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;

    let fields = order_fields(state.catalog()?).await?;
    Ok(Json(table_page(rows, ORDER_ROW_KEEP, fields, &descriptor)))
}

// ── Create ──────────────────────────────────────────────────────────────────

fn coordinate(body: &Payload, key: &str) -> Result<f64, AppError> {
    body.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| AppError::BadRequest(format!("{key} must be a number")))
}

/// Zone and placement rules a new storage has to satisfy.
async fn check_placement(
    state: &AppState,
    ctx: &RequestContext,
    body: &Payload,
) -> Result<(), AppError> {
    let pool = state.db()?;
    let zone_id =
        body_uuid(body, "zoneId")?.ok_or_else(|| AppError::bad_request("zoneId is required"))?;
    let storage_type = body
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::bad_request("type is required"))?;

    let geo_id = db::zones::geo_id(pool, zone_id)
        .await?
        .ok_or_else(|| AppError::not_found("Zone not found"))?;

    let check = PointInZone {
        geo_id,
        latitude: coordinate(body, "latitude")?,
        longitude: coordinate(body, "longitude")?,
    };
    let placement = state.rpc()?.send(ctx, &check).await?;
    if !placement.in_zone {
        return Err(AppError::BadRequest(format!("Can not create {storage_type}")));
    }

    if storage_type == TYPE_PUP && !db::storages::zone_has_dc(pool, zone_id).await? {
        return Err(AppError::not_found("DC not found in zone"));
    }
    Ok(())
}

async fn create_storage(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    TimeZone(tz): TimeZone,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::DcManager])?;
    let body = extract_json(body)?;
    check_placement(&state, &ctx, &body).await?;

    let op = wms::StorageCreate {
        body,
        company_id: company_id.to_string(),
        tz,
    };
    forward(&state, &ctx, &op).await
}

// ── Order handling at a storage ─────────────────────────────────────────────

async fn receive_order(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, dc_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::OrderReceive {
        body,
        storage_id: dc_id.to_string(),
        user_id: caller.subject()?.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn close_route(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, dc_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::RouteClose {
        body,
        storage_id: dc_id.to_string(),
        user_id: caller.subject()?.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn set_code(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, dc_id, order_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::OrderSetCode {
        body,
        order_id: order_id.to_string(),
        storage_id: Some(dc_id.to_string()),
        user_id: caller.sub,
    };
    forward(&state, &ctx, &op).await
}

async fn give(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((_company_id, dc_id, order_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = wms::OrderGive {
        body,
        order_id: order_id.to_string(),
        dc_id: Some(dc_id.to_string()),
        user_id: caller.sub,
    };
    forward(&state, &ctx, &op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_must_be_numbers() {
        let mut body = Payload::new();
        body.insert("latitude".into(), json!(41.31));
        body.insert("longitude".into(), json!("69.2"));
        assert_eq!(coordinate(&body, "latitude").unwrap(), 41.31);
        assert_eq!(
            coordinate(&body, "longitude").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
