//! # Users
//!
//! User accounts live in the identity provider and are managed through
//! `ums`. Reads of the local copy come from the database.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_rpc_client::ops::ums;
use uuid::Uuid;

use super::{forward, relay, JsonBody};
use crate::auth::{require_any_role, Caller, Role};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", patch(update_user))
        .route(
            "/users/:user_id/groups",
            get(user_groups).post(add_to_group).delete(remove_from_group),
        )
        .route("/users/:user_id/attribute", post(add_attributes))
        .route("/users/:user_id/companies", get(user_companies))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::users::list(state.db()?).await?))
}

async fn user_companies(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    Ok(Json(db::users::companies(state.db()?, user_id).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::UserCreate, Role::UserManagement])?;
    let body = extract_json(body)?;
    forward(&state, &ctx, &ums::UserCreate { body }).await
}

async fn update_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(user_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::UserUpdate, Role::UserManagement])?;
    let body = extract_json(body)?;
    let op = ums::UserUpdate {
        body,
        id: user_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

// ── Group membership ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupRef {
    group_id: Uuid,
}

async fn user_groups(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let op = ums::UserGroupMembers {
        id: user_id.to_string(),
    };
    relay(&state, &ctx, &op).await
}

async fn add_to_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(user_id): ApiPath<Uuid>,
    body: Result<Json<GroupRef>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let GroupRef { group_id } = extract_json(body)?;
    let op = ums::UserAddToGroup {
        id: user_id.to_string(),
        group_id: group_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn remove_from_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(user_id): ApiPath<Uuid>,
    body: Result<Json<GroupRef>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let GroupRef { group_id } = extract_json(body)?;
    let op = ums::UserDeleteFromGroup {
        id: user_id.to_string(),
        group_id: group_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

/// Merge custom attributes into the identity provider's user record.
async fn add_attributes(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(user_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let attributes = extract_json(body)?;
    let op = ums::UserAddAttributes {
        id: user_id.to_string(),
        attributes,
    };
    forward(&state, &ctx, &op).await
}
