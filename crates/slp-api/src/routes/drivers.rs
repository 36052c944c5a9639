//! # Drivers
//!
//! | Method | Path (under `/companies/:company_id/drivers`) | Backend             |
//! |--------|------------------------------------------------|---------------------|
//! | GET    | `/`                                            | table read          |
//! | GET    | `/available-drivers`                           | read                |
//! | GET    | `/:driver_id`                                  | read                |
//! | POST   | `/`                                            | `ums driver.create` |
//! | PATCH  | `/:driver_id`                                  | `ums driver.update` |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::{ums, Payload};
use sqlx::PgPool;
use uuid::Uuid;

use super::{body_uuid, forward, table_page, JsonBody};
use crate::db;
use crate::db::catalog::Relation;
use crate::db::storages::TYPE_PUP;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx, PageParams};
use crate::state::AppState;

const DRIVER_STORAGE_EXCLUDES: &[&str] = &[
    "id",
    "code",
    "address",
    "latitude",
    "longitude",
    "type",
    "status",
    "tz",
    "company_id",
    "zone_id",
    "created_at",
    "updated_at",
];

const DRIVER_ROW_KEEP: &[&str] = &["licenseExpireDate", "idCardExpireDate", "createdAt"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/drivers",
            get(list_drivers).post(create_driver),
        )
        .route(
            "/companies/:company_id/drivers/available-drivers",
            get(available_drivers),
        )
        .route(
            "/companies/:company_id/drivers/:driver_id",
            get(get_driver).patch(update_driver),
        )
}

async fn list_drivers(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;
    let descriptor = paging.paginate(db::drivers::count(pool, company_id).await?);
    let rows = db::drivers::list(
        pool,
        company_id,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;

    let relation = Relation::root("driver", &[])
        .join(Relation::nested("vehicle", "vehicle", &[]))
        .join(Relation::nested("user", "user", &[]))
        .join(Relation::nested("storage", "storage", DRIVER_STORAGE_EXCLUDES));
    let fields = state.catalog()?.describe_joined(&relation).await?;

    Ok(Json(table_page(rows, DRIVER_ROW_KEEP, fields, &descriptor)))
}

async fn available_drivers(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::drivers::available(state.db()?, company_id).await?))
}

async fn get_driver(
    State(state): State<AppState>,
    ApiPath((company_id, driver_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let driver = db::drivers::get(state.db()?, company_id, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Driver not found"))?;
    Ok(Json(driver))
}

/// A driver's home storage has to be a DC.
async fn check_home_storage(pool: &PgPool, body: &Payload) -> Result<(), AppError> {
    let Some(dc_id) = body_uuid(body, "dcId")? else {
        return Ok(());
    };
    match db::storages::storage_type(pool, dc_id).await? {
        None => Err(AppError::not_found("Storage not found")),
        Some(kind) if kind == TYPE_PUP => Err(AppError::not_found("Storage is PUP")),
        Some(_) => Ok(()),
    }
}

async fn create_driver(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    check_home_storage(state.db()?, &body).await?;
    let op = ums::DriverCreate {
        body,
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn update_driver(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, driver_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = ums::DriverUpdate {
        body,
        id: driver_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}
