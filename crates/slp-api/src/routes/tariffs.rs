//! Delivery tariffs of a company. Reads come from the database, writes go
//! to `tms tariff.*`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::tms;
use uuid::Uuid;

use super::{forward, table_page, JsonBody};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx, PageParams};
use crate::state::AppState;

const TARIFF_EXCLUDES: &[&str] = &["company_id"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/tariffs",
            get(list_tariffs).post(create_tariff),
        )
        .route(
            "/companies/:company_id/tariffs/:tariff_id",
            get(get_tariff).patch(update_tariff).delete(delete_tariff),
        )
}

async fn list_tariffs(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;
    let descriptor = paging.paginate(db::tariffs::count(pool, company_id).await?);
    let rows = db::tariffs::list(
        pool,
        company_id,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;
    let fields = state
        .catalog()?
        .describe_table("tariff", TARIFF_EXCLUDES, "")
        .await?;
    Ok(Json(table_page(rows, &[], fields, &descriptor)))
}

async fn get_tariff(
    State(state): State<AppState>,
    ApiPath((company_id, tariff_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let tariff = db::tariffs::get(state.db()?, company_id, tariff_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tariff not found"))?;
    Ok(Json(tariff))
}

async fn create_tariff(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::TariffCreate {
        body,
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn update_tariff(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, tariff_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::TariffUpdate {
        body,
        id: tariff_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn delete_tariff(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, tariff_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let op = tms::TariffDelete {
        id: tariff_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}
