//! # Pools
//!
//! A pool gathers order deliveries leaving one storage before they are
//! split into routes.
//!
//! | Method | Path (under `/companies/:company_id/pools`) | Backend                        |
//! |--------|----------------------------------------------|--------------------------------|
//! | GET    | `/`                                          | table read                     |
//! | GET    | `/:pool_id/orders`                           | pool aggregate                 |
//! | PUT    | `/:pool_id/orders/:order_delivery_id`        | `tms order-delivery.update-pool` |
//! | PUT    | `/:pool_id/move`                             | `tms pool.move-to-route`       |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::tms;
use uuid::Uuid;

use super::{forward, table_page, JsonBody};
use crate::db;
use crate::db::catalog::Relation;
use crate::db::pools::PoolFilter;
use crate::error::AppError;
use crate::extractors::{extract_json, parse_datetime, ApiPath, ApiQuery, Ctx, PageParams};
use crate::services::aggregate::{self, PoolOrders};
use crate::state::AppState;

const POOL_EXCLUDES: &[&str] = &["company_id", "updated_at"];

const POOL_STORAGE_EXCLUDES: &[&str] = &[
    "id",
    "company_id",
    "code",
    "address",
    "type",
    "status",
    "tz",
    "latitude",
    "longitude",
    "zone_id",
    "created_at",
    "updated_at",
];

const POOL_ROW_KEEP: &[&str] = &["from", "to", "latitude", "longitude", "createdAt"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies/:company_id/pools", get(list_pools))
        .route("/companies/:company_id/pools/:pool_id/orders", get(pool_orders))
        .route(
            "/companies/:company_id/pools/:pool_id/orders/:order_delivery_id",
            put(change_pool),
        )
        .route("/companies/:company_id/pools/:pool_id/move", put(move_to_route))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolQuery {
    status: Option<String>,
    storage_name: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl PoolQuery {
    fn into_filter(self) -> Result<PoolFilter, AppError> {
        Ok(PoolFilter {
            status: self.status.filter(|s| !s.is_empty()),
            storage_name: self.storage_name.filter(|s| !s.is_empty()),
            from: parse_datetime("from", self.from.as_deref())?,
            to: parse_datetime("to", self.to.as_deref())?,
        })
    }
}

async fn list_pools(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<PoolQuery>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let filter = query.into_filter()?;
    let pool = state.db()?;

    let descriptor = paging.paginate(db::pools::count(pool, company_id, &filter).await?);
    let rows = db::pools::list(
        pool,
        company_id,
        &filter,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;

    let relation = Relation::root("pool", POOL_EXCLUDES)
        .join(Relation::nested("storage", "storage", POOL_STORAGE_EXCLUDES));
    let fields = state.catalog()?.describe_joined(&relation).await?;

    Ok(Json(table_page(rows, POOL_ROW_KEEP, fields, &descriptor)))
}

async fn pool_orders(
    State(state): State<AppState>,
    ApiPath((company_id, pool_id)): ApiPath<(Uuid, Uuid)>,
    paging: PageParams,
) -> Result<Json<PoolOrders>, AppError> {
    let orders = aggregate::pool_orders(
        state.db()?,
        state.catalog()?,
        state.matrix()?,
        company_id,
        pool_id,
        paging,
    )
    .await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewPool {
    new_pool_id: Uuid,
}

/// Move one order delivery from this pool to another.
async fn change_pool(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, pool_id, order_delivery_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    body: Result<Json<NewPool>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let target = extract_json(body)?;
    let op = tms::OrderDeliveryUpdatePool {
        old_pool_id: pool_id.to_string(),
        delivery_order_id: order_delivery_id.to_string(),
        new_pool_id: target.new_pool_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn move_to_route(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, pool_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::PoolMoveToRoute {
        body,
        pool_id: pool_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}
