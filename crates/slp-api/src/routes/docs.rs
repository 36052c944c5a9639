//! Printed documents behind QR codes. Opened from a phone camera, so no
//! token is required.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::extractors::ApiPath;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/docs/act/:act_id", get(act))
        .route("/docs/ttn/:ttn_id", get(ttn))
}

async fn act(
    State(state): State<AppState>,
    ApiPath(act_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let act = db::docs::act(state.db()?, act_id)
        .await?
        .ok_or_else(|| AppError::not_found("Act not found"))?;
    Ok(Json(act))
}

async fn ttn(
    State(state): State<AppState>,
    ApiPath(ttn_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let ttn = db::docs::ttn(state.db()?, ttn_id)
        .await?
        .ok_or_else(|| AppError::not_found("TTN not found"))?;
    Ok(Json(ttn))
}
