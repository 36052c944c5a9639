//! # API Route Modules
//!
//! One router per domain, all mounted under `/api/v1` by [`crate::app`]:
//!
//! - `companies`: company list, groups and roles (UMS).
//! - `orders`: order table, lookups and order writes (OMS, WMS, TMS).
//! - `routes`: route table, route legs and the route aggregate.
//! - `pools`: pool table and the pool aggregate.
//! - `dcs`: storages (DCs and pickup points) and their order handling.
//! - `couriers`: everything the courier app calls.
//! - `zones`: delivery zones with geometry from the geo service.
//! - `tariffs`, `settings`, `planners`: company configuration (TMS).
//! - `drivers`, `vehicles`: fleet (UMS, FMS).
//! - `users`: platform users and their groups (UMS).
//! - `auth`, `docs`, `health`: unauthenticated surface.
//!
//! Reads go to PostgreSQL. Writes are forwarded to a backend service and
//! answer 204; pass-through reads and calculators answer 200 with the
//! service's data.

pub mod auth;
pub mod companies;
pub mod couriers;
pub mod dcs;
pub mod docs;
pub mod drivers;
pub mod health;
pub mod orders;
pub mod planners;
pub mod pools;
pub mod routes;
pub mod settings;
pub mod tariffs;
pub mod users;
pub mod vehicles;
pub mod zones;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use slp_core::{flatten_rows, FieldDescriptor, OffsetPage, PaginationDescriptor, ResponseEnvelope};
use slp_rpc_client::ops::Payload;
use slp_rpc_client::{RequestContext, RpcOperation};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// A JSON object body, rejected with a 400 when malformed.
pub(crate) type JsonBody = Result<Json<Payload>, JsonRejection>;

/// Send a write and answer 204.
pub(crate) async fn forward<O: RpcOperation>(
    state: &AppState,
    ctx: &RequestContext,
    op: &O,
) -> Result<StatusCode, AppError> {
    state.rpc()?.send(ctx, op).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send an operation and answer 200 with its data.
pub(crate) async fn relay<O>(
    state: &AppState,
    ctx: &RequestContext,
    op: &O,
) -> Result<Json<O::Response>, AppError>
where
    O: RpcOperation,
    O::Response: Serialize,
{
    let data = state.rpc()?.send(ctx, op).await?;
    Ok(Json(data))
}

/// Flatten one page of rows into the table envelope.
pub(crate) fn table_page(
    rows: Vec<Value>,
    keep: &[&str],
    fields: Vec<FieldDescriptor>,
    descriptor: &PaginationDescriptor,
) -> ResponseEnvelope<Value> {
    let data = flatten_rows(&rows, keep);
    ResponseEnvelope::from_offset(OffsetPage::from_descriptor(data, fields, descriptor))
}

/// Optional uuid under `key` of a request body.
pub(crate) fn body_uuid(body: &Payload, key: &str) -> Result<Option<Uuid>, AppError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{key} must be a uuid"))),
        Some(_) => Err(AppError::BadRequest(format!("{key} must be a uuid"))),
    }
}

/// Optional integer filter from the query string.
pub(crate) fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<i32>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{name} must be a number, got '{s}'"))),
    }
}

/// `true`, `1` and `yes` switch a flag on.
pub(crate) fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("true" | "1" | "yes"))
}
