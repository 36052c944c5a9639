//! # Delivery Zones
//!
//! | Method | Path (under `/companies/:company_id/zones`) | Backend                       |
//! |--------|----------------------------------------------|-------------------------------|
//! | GET    | `/`                                          | read + `geo place.list`       |
//! | POST   | `/`                                          | `tms zone.create`             |
//! | POST   | `/check-point`                               | `tms zone.check-point`        |
//! | POST   | `/address-point`                             | `geo place.address-by-point`  |
//! | GET    | `/:zone_id`                                  | read                          |
//! | PUT    | `/:zone_id`                                  | `tms zone.update`             |
//! | DELETE | `/:zone_id`                                  | `tms zone.delete`             |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use slp_rpc_client::ops::{geo, tms};
use uuid::Uuid;

use super::{forward, relay, JsonBody};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, AcceptLanguage, ApiPath, Ctx};
use crate::services::zone_map;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/zones",
            get(list_zones).post(create_zone),
        )
        .route("/companies/:company_id/zones/check-point", post(check_point))
        .route("/companies/:company_id/zones/address-point", post(address_point))
        .route(
            "/companies/:company_id/zones/:zone_id",
            get(get_zone).put(update_zone).delete(delete_zone),
        )
}

async fn list_zones(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    let zones = zone_map::zone_map(state.db()?, state.rpc()?, &ctx, company_id).await?;
    Ok(Json(zones))
}

async fn get_zone(
    State(state): State<AppState>,
    ApiPath((company_id, zone_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let zone = db::zones::get(state.db()?, company_id, zone_id)
        .await?
        .ok_or_else(|| AppError::not_found("Zone not found"))?;
    Ok(Json(zone))
}

/// Every backend rejection of a new zone is reported as a bad request.
async fn create_zone(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::ZoneCreate {
        body,
        company_id: company_id.to_string(),
    };
    state
        .rpc()?
        .send(&ctx, &op)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_zone(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((company_id, zone_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::ZoneUpdate {
        body,
        id: zone_id.to_string(),
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

/// A zone still holding a storage cannot be deleted.
async fn delete_zone(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((company_id, zone_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if db::zones::get(state.db()?, company_id, zone_id).await?.is_none() {
        return Err(AppError::not_found("Zone not found"));
    }
    if db::storages::zone_in_use(state.db()?, zone_id).await? {
        return Err(AppError::bad_request("Zone has storages"));
    }
    let op = tms::ZoneDelete {
        id: zone_id.to_string(),
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn check_point(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<Json<Value>, AppError> {
    let body = extract_json(body)?;
    let op = tms::ZoneCheckPoint {
        body,
        company_id: company_id.to_string(),
    };
    relay(&state, &ctx, &op).await
}

async fn address_point(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    AcceptLanguage(lang): AcceptLanguage,
    ApiPath(_company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<Json<Value>, AppError> {
    let body = extract_json(body)?;
    relay(&state, &ctx, &geo::AddressByPoint { body, lang }).await
}
