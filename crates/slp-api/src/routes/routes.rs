//! # Delivery Routes
//!
//! | Method | Path (under `/companies/:company_id/routes`) | Backend                  |
//! |--------|-----------------------------------------------|--------------------------|
//! | POST   | `/pool-id`                                    | `tms route.create`       |
//! | GET    | `/`                                           | table read               |
//! | GET    | `/:route_id/order-deliveries`                 | table read               |
//! | GET    | `/:route_id/orders`                           | route aggregate          |
//! | PUT    | `/:route_id/move`                             | `tms route.move-to-pool` |
//! | GET    | `/:route_id/unpaid`                           | `tms route.unpaid`       |

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_core::{ActionType, FieldDescriptor, FieldType, OffsetPage, ResponseEnvelope};
use slp_rpc_client::ops::tms;
use uuid::Uuid;

use super::{forward, parse_flag, parse_number, relay, table_page, JsonBody};
use crate::db;
use crate::db::catalog::{Introspector, Relation};
use crate::db::routes::RouteFilter;
use crate::error::AppError;
use crate::extractors::{extract_json, parse_datetime, ApiPath, ApiQuery, Ctx, PageParams};
use crate::services::aggregate::{self, RouteOrders};
use crate::state::AppState;

const ROUTE_EXCLUDES: &[&str] = &["updated_at"];

const ROUTE_POOL_EXCLUDES: &[&str] = &[
    "id",
    "company_id",
    "code",
    "status",
    "storage_id",
    "created_at",
    "updated_at",
];

const LEG_EXCLUDES: &[&str] = &["route_id"];

const LEG_ORDER_EXCLUDES: &[&str] = &[
    "id",
    "pool_id",
    "external_id",
    "storage_id",
    "images",
    "company_id",
    "order_group_id",
    "sender_id",
    "recipient_id",
    "is_canceled",
    "box_id",
    "external_number",
    "updated_at",
    "created_at",
    "note",
    "fragile",
    "code",
    "cell_code",
];

const ROUTE_ROW_KEEP: &[&str] = &["from", "to", "latitude", "longitude", "createdAt"];
const LEG_ROW_KEEP: &[&str] = &["to", "from", "dimensions", "deliveryStartAt"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies/:company_id/routes", get(list_routes))
        .route("/companies/:company_id/routes/pool-id", post(create_route))
        .route(
            "/companies/:company_id/routes/:route_id/order-deliveries",
            get(route_legs),
        )
        .route("/companies/:company_id/routes/:route_id/orders", get(route_orders))
        .route("/companies/:company_id/routes/:route_id/move", put(move_to_pool))
        .route("/companies/:company_id/routes/:route_id/unpaid", get(unpaid))
}

// ── Route table ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RouteQuery {
    number: Option<String>,
    status: Option<String>,
    from: Option<String>,
    to: Option<String>,
    active: Option<String>,
}

impl RouteQuery {
    fn into_filter(self) -> Result<RouteFilter, AppError> {
        Ok(RouteFilter {
            number: parse_number("number", self.number.as_deref())?,
            status: self.status.filter(|s| !s.is_empty()),
            from: parse_datetime("from", self.from.as_deref())?,
            to: parse_datetime("to", self.to.as_deref())?,
            active: parse_flag(self.active.as_deref()),
        })
    }
}

async fn route_fields(catalog: &Introspector) -> Result<Vec<FieldDescriptor>, AppError> {
    let relation = Relation::root("route", ROUTE_EXCLUDES)
        .join(Relation::nested("pool", "pool", ROUTE_POOL_EXCLUDES));
    let mut fields = catalog.describe_joined(&relation).await?;
    fields.push(FieldDescriptor::synthetic("name", FieldType::String, false));
    Ok(fields)
}

/// Routes of the company. `active` lists every undelivered route as one page.
async fn list_routes(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<RouteQuery>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let filter = query.into_filter()?;
    let pool = state.db()?;
    let fields = route_fields(state.catalog()?).await?;

    if filter.active {
        let rows = db::routes::list(pool, company_id, &filter, None).await?;
        let data = slp_core::flatten_rows(&rows, ROUTE_ROW_KEEP);
        return Ok(Json(ResponseEnvelope::from_offset(OffsetPage::single(
            data, fields,
        ))));
    }

    let descriptor = paging.paginate(db::routes::count(pool, company_id, &filter).await?);
    let rows = db::routes::list(
        pool,
        company_id,
        &filter,
        Some((descriptor.limit_i64(), descriptor.offset_i64())),
    )
    .await?;
    Ok(Json(table_page(rows, ROUTE_ROW_KEEP, fields, &descriptor)))
}

// ── Legs of a route ─────────────────────────────────────────────────────────

/// Tag each leg with what the courier does where it starts.
fn tag_leg_actions(legs: &mut [Value]) {
    for leg in legs.iter_mut() {
        let from_type = leg
            .pointer("/from/type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let action = ActionType::for_origin(from_type);
        if let Some(map) = leg.as_object_mut() {
            map.insert("type".into(), Value::String(action.as_str().into()));
        }
    }
}

async fn route_legs(
    State(state): State<AppState>,
    ApiPath((company_id, route_id)): ApiPath<(Uuid, Uuid)>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;

    let descriptor = paging.paginate(db::routes::count_legs(pool, company_id, route_id).await?);
    let mut rows = db::routes::legs_page(
        pool,
        company_id,
        route_id,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;
    tag_leg_actions(&mut rows);

    let relation = Relation::root("order_delivery", LEG_EXCLUDES)
        .join(Relation::nested("order", "order", LEG_ORDER_EXCLUDES));
    let mut fields = state.catalog()?.describe_joined(&relation).await?;
    fields.push(FieldDescriptor::synthetic("type", FieldType::String, false));
    fields.push(FieldDescriptor::synthetic("documentTTNId", FieldType::String, false));

    Ok(Json(table_page(rows, LEG_ROW_KEEP, fields, &descriptor)))
}

async fn route_orders(
    State(state): State<AppState>,
    ApiPath((company_id, route_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<RouteOrders>, AppError> {
    let pool = state.db()?;
    let matrix = state.matrix()?;
    let orders = aggregate::route_orders(pool, matrix, company_id, route_id).await?;
    Ok(Json(orders))
}

// ── Writes ──────────────────────────────────────────────────────────────────

async fn create_route(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(_company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    forward(&state, &ctx, &tms::RouteCreate { body }).await
}

async fn move_to_pool(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, route_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::RouteMoveToPool {
        body,
        route_id: route_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn unpaid(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, route_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let op = tms::RouteUnpaid {
        route_id: route_id.to_string(),
    };
    relay(&state, &ctx, &op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legs_leaving_a_dc_are_gives() {
        let mut legs = vec![
            json!({"from": {"type": "DC"}}),
            json!({"from": {"type": "COORDINATE"}}),
            json!({"from": null}),
        ];
        tag_leg_actions(&mut legs);
        assert_eq!(legs[0]["type"], "GIVE");
        assert_eq!(legs[1]["type"], "TAKE");
        assert_eq!(legs[2]["type"], "TAKE");
    }

    #[test]
    fn active_flag_reaches_the_filter() {
        let query = RouteQuery {
            active: Some("true".into()),
            status: Some("ROUTED".into()),
            ..RouteQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.active);
        assert_eq!(filter.status.as_deref(), Some("ROUTED"));
    }
}
