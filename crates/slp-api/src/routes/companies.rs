//! # Companies, Groups and Roles
//!
//! | Method | Path                                          | Backend               |
//! |--------|-----------------------------------------------|-----------------------|
//! | GET    | `/companies`                                  | table read            |
//! | POST   | `/companies`                                  | `ums company.create`  |
//! | PATCH  | `/companies/:company_id`                      | `tms company.update`  |
//! | GET    | `/companies/roles`                            | `ums role.list`       |
//! | GET    | `/companies/:company_id/groups`               | `ums group.list`      |
//! | POST   | `/companies/:company_id/groups/create`        | `ums group.create`    |
//! | PATCH  | `/companies/:company_id/groups`               | `ums group.update`    |
//! | GET    | `/companies/:company_id/groups/:group_id`     | `ums group.find-one`  |
//! | DELETE | `/companies/:company_id/groups/:group_id`     | `ums group.delete`    |
//! | POST   | `/companies/:company_id/groups/:group_id/roles` | `ums group.add-role` |
//! | DELETE | `/companies/:company_id/groups/:group_id/roles` | `ums group.delete-role` |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::{tms, ums};
use uuid::Uuid;

use super::{forward, relay, table_page, JsonBody};
use crate::auth::{require_any_role, Caller, Role};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, ApiQuery, Ctx, PageParams};
use crate::state::AppState;

const COMPANY_EXCLUDES: &[&str] = &["updated_at"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/roles", get(list_roles))
        .route("/companies/:company_id", patch(update_company))
        .route(
            "/companies/:company_id/groups",
            get(list_groups).patch(update_group),
        )
        .route("/companies/:company_id/groups/create", post(create_group))
        .route(
            "/companies/:company_id/groups/:group_id",
            get(get_group).delete(delete_group),
        )
        .route(
            "/companies/:company_id/groups/:group_id/roles",
            post(add_group_role).delete(delete_group_role),
        )
}

// ── Companies ───────────────────────────────────────────────────────────────

async fn list_companies(
    State(state): State<AppState>,
    caller: Caller,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    require_any_role(&caller, &[Role::CompanyRead, Role::CompanyManagement])?;
    let pool = state.db()?;

    let descriptor = paging.paginate(db::companies::count(pool).await?);
    let rows =
        db::companies::list(pool, descriptor.limit_i64(), descriptor.offset_i64()).await?;
    let fields = state
        .catalog()?
        .describe_table("company", COMPANY_EXCLUDES, "")
        .await?;

    Ok(Json(table_page(rows, &[], fields, &descriptor)))
}

async fn create_company(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::CompanyCreate, Role::CompanyManagement])?;
    let body = extract_json(body)?;
    forward(&state, &ctx, &ums::CompanyCreate { body }).await
}

async fn update_company(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(&caller, &[Role::CompanyUpdate, Role::CompanyManagement])?;
    let body = extract_json(body)?;
    let op = tms::CompanyUpdate {
        body,
        id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn list_roles(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
) -> Result<Json<Value>, AppError> {
    require_any_role(&caller, &[Role::RoleRead, Role::CompanyManagement])?;
    relay(&state, &ctx, &ums::RoleList::default()).await
}

// ── Groups ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupQuery {
    #[serde(default)]
    is_primary: Option<bool>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleRef {
    role_id: String,
}

async fn list_groups(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<GroupQuery>,
) -> Result<Json<Value>, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupRead, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let op = ums::GroupList {
        id: company_id.to_string(),
        is_primary: query.is_primary.unwrap_or(false),
        role: query.role,
    };
    relay(&state, &ctx, &op).await
}

async fn create_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupCreate, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let body = extract_json(body)?;
    let op = ums::GroupCreate {
        body,
        id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn get_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((company_id, group_id)): ApiPath<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupRead, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let op = ums::GroupFindOne {
        id: company_id.to_string(),
        group_id,
    };
    relay(&state, &ctx, &op).await
}

async fn update_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupUpdate, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let mut body = extract_json(body)?;
    body.insert("companyId".into(), Value::String(company_id.to_string()));
    forward(&state, &ctx, &ums::GroupUpdate { body }).await
}

async fn delete_group(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((company_id, group_id)): ApiPath<(Uuid, String)>,
) -> Result<StatusCode, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupDelete, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let op = ums::GroupDelete {
        group_id,
        company_id: company_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn add_group_role(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((company_id, group_id)): ApiPath<(Uuid, String)>,
    body: Result<Json<RoleRef>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupUpdate, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let role = extract_json(body)?;
    let op = ums::GroupAddRole {
        company_id: company_id.to_string(),
        role_id: role.role_id,
        group_id,
    };
    forward(&state, &ctx, &op).await
}

async fn delete_group_role(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    caller: Caller,
    ApiPath((company_id, group_id)): ApiPath<(Uuid, String)>,
    body: Result<Json<RoleRef>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    require_any_role(
        &caller,
        &[Role::GroupUpdate, Role::GroupManagement, Role::CompanyManagement],
    )?;
    let role = extract_json(body)?;
    let op = ums::GroupDeleteRole {
        company_id: company_id.to_string(),
        role_id: role.role_id,
        group_id,
    };
    forward(&state, &ctx, &op).await
}
