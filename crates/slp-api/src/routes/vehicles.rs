//! # Vehicles and Fleet Catalogs
//!
//! | Method | Path (under `/companies/:company_id/vehicles`) | Backend               |
//! |--------|-------------------------------------------------|-----------------------|
//! | GET    | `/`                                             | table read            |
//! | POST   | `/`                                             | `fms vehicle.create`  |
//! | PATCH  | `/:vehicle_id`                                  | `fms vehicle.update`  |
//! | GET    | `/mileages`                                     | read                  |
//! | POST   | `/:vehicle_id/mileage`                          | `fms mileage.create`  |
//! | PATCH  | `/:vehicle_id/mileage`                          | `fms mileage.update`  |
//! | GET    | `/{catalog}`                                    | read                  |
//! | POST   | `/{catalog}`                                    | `fms {catalog}.create` |
//! | PATCH  | `/{catalog}/:catalog_id`                        | `fms {catalog}.update` |
//!
//! `{catalog}` is one of `producer`, `model`, `type`, `body-type`,
//! `colour` and `luggage`. Each gets its own static route so it wins over
//! `/:vehicle_id`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::fms::{self, FleetCatalog};
use slp_rpc_client::ops::Payload;
use slp_rpc_client::RequestContext;
use uuid::Uuid;

use super::{forward, table_page, JsonBody};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx, PageParams};
use crate::state::AppState;

const VEHICLE_EXCLUDES: &[&str] = &["company_id"];

pub fn router() -> Router<AppState> {
    let mut router = Router::new()
        .route(
            "/companies/:company_id/vehicles",
            get(list_vehicles).post(create_vehicle),
        )
        .route("/companies/:company_id/vehicles/mileages", get(list_mileages))
        .route(
            "/companies/:company_id/vehicles/:vehicle_id",
            patch(update_vehicle),
        )
        .route(
            "/companies/:company_id/vehicles/:vehicle_id/mileage",
            post(create_mileage).patch(update_mileage),
        );

    for catalog in FleetCatalog::ALL {
        let base = format!("/companies/:company_id/vehicles/{}", catalog.segment());
        let list = move |state: State<AppState>, path: ApiPath<Uuid>| {
            list_catalog(state, path, catalog)
        };
        let create = move |state: State<AppState>, ctx: Ctx, path: ApiPath<Uuid>, body: JsonBody| {
            create_catalog_entry(state, ctx, path, body, catalog)
        };
        let update =
            move |state: State<AppState>, ctx: Ctx, path: ApiPath<(Uuid, i64)>, body: JsonBody| {
                update_catalog_entry(state, ctx, path, body, catalog)
            };
        router = router
            .route(&base, get(list).post(create))
            .route(&format!("{base}/:catalog_id"), patch(update));
    }
    router
}

// ── Vehicles ────────────────────────────────────────────────────────────────

async fn list_vehicles(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;
    let descriptor = paging.paginate(db::vehicles::count(pool, company_id).await?);
    let rows = db::vehicles::list(
        pool,
        company_id,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;
    let fields = state
        .catalog()?
        .describe_table("vehicle", VEHICLE_EXCLUDES, "")
        .await?;
    Ok(Json(table_page(rows, &[], fields, &descriptor)))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = fms::VehicleCreate {
        body,
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn update_vehicle(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((company_id, vehicle_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = fms::VehicleUpdate {
        body,
        id: vehicle_id.to_string(),
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

// ── Mileage ─────────────────────────────────────────────────────────────────

async fn list_mileages(
    State(state): State<AppState>,
    ApiPath(_company_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::vehicles::mileages(state.db()?).await?))
}

async fn create_mileage(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, vehicle_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = fms::MileageCreate {
        body,
        id: vehicle_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn update_mileage(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, vehicle_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = fms::MileageUpdate {
        body,
        id: vehicle_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

// ── Catalogs ────────────────────────────────────────────────────────────────

async fn list_catalog(
    State(state): State<AppState>,
    ApiPath(_company_id): ApiPath<Uuid>,
    catalog: FleetCatalog,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::vehicles::catalog(state.db()?, catalog).await?))
}

async fn create_catalog_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(_company_id): ApiPath<Uuid>,
    body: JsonBody,
    catalog: FleetCatalog,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    send_create(&state, &ctx, catalog, body).await
}

async fn update_catalog_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, id)): ApiPath<(Uuid, i64)>,
    body: JsonBody,
    catalog: FleetCatalog,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    send_update(&state, &ctx, catalog, body, id).await
}

async fn send_create(
    state: &AppState,
    ctx: &RequestContext,
    catalog: FleetCatalog,
    body: Payload,
) -> Result<StatusCode, AppError> {
    match catalog {
        FleetCatalog::Producer => forward(state, ctx, &fms::ProducerCreate { body }).await,
        FleetCatalog::Model => forward(state, ctx, &fms::ModelCreate { body }).await,
        FleetCatalog::Type => forward(state, ctx, &fms::TypeCreate { body }).await,
        FleetCatalog::BodyType => forward(state, ctx, &fms::BodyTypeCreate { body }).await,
        FleetCatalog::Colour => forward(state, ctx, &fms::ColourCreate { body }).await,
        FleetCatalog::Luggage => forward(state, ctx, &fms::LuggageCreate { body }).await,
    }
}

async fn send_update(
    state: &AppState,
    ctx: &RequestContext,
    catalog: FleetCatalog,
    body: Payload,
    id: i64,
) -> Result<StatusCode, AppError> {
    match catalog {
        FleetCatalog::Producer => forward(state, ctx, &fms::ProducerUpdate { body, id }).await,
        FleetCatalog::Model => forward(state, ctx, &fms::ModelUpdate { body, id }).await,
        FleetCatalog::Type => forward(state, ctx, &fms::TypeUpdate { body, id }).await,
        FleetCatalog::BodyType => forward(state, ctx, &fms::BodyTypeUpdate { body, id }).await,
        FleetCatalog::Colour => forward(state, ctx, &fms::ColourUpdate { body, id }).await,
        FleetCatalog::Luggage => forward(state, ctx, &fms::LuggageUpdate { body, id }).await,
    }
}
