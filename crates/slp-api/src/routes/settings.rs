//! Company settings: serve time per stop, density and whatever else the
//! transport service keeps per company.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use slp_rpc_client::ops::tms;
use uuid::Uuid;

use super::{forward, JsonBody};
use crate::auth::{require_any_role, Caller, Role};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/companies/:company_id/settings",
        get(get_settings).patch(update_settings),
    )
}

async fn get_settings(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let settings = db::settings::get(state.db()?, company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company settings not found"))?;
    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::CompanyUpdate, Role::CompanyManagement])?;
    let body = extract_json(body)?;
    let op = tms::CompanySettingsUpdate {
        body,
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}
