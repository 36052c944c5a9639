//! # Couriers
//!
//! The dispatcher's courier list comes from the search engine; everything
//! else here serves the courier's mobile app.
//!
//! | Method | Path (under `/companies/:company_id/couriers`)          | Backend |
//! |--------|---------------------------------------------------------|---------|
//! | GET    | `/`                                                     | search  |
//! | GET    | `/get-storages`                                         | read    |
//! | PATCH  | `/:courier_id`                                          | `ums driver.update` |
//! | GET    | `/:courier_id/routes-orders`                            | read    |
//! | GET    | `/:courier_id/routes/:route_id/docs`                    | read    |
//! | PATCH  | `/:courier_id/routes/:route_id/courier-on-way`          | `tms route.courier-on-way` |
//! | PATCH  | `/:courier_id/routes/:route_id/courier-accepted`        | `tms route.courier-accepted` |
//! | POST   | `/:courier_id/routes-orders/:order_delivery_id/qr-code` | `tms order-delivery.courier-took` |
//! | PATCH  | `/:courier_id/routes-orders/courier-on-point`           | `tms order-delivery.courier-on-point` |
//! | PATCH  | `/:courier_id/routes-orders/delivered`                  | `tms order-delivery.delivered` |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::{tms, ums};
use slp_rpc_client::SearchQuery;
use uuid::Uuid;

use super::{forward, JsonBody};
use crate::db;
use crate::db::catalog::Relation;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, ApiQuery, Ctx, PageParams};
use crate::services::courier_board::{self, CourierRoutes};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies/:company_id/couriers", get(search_couriers))
        .route("/companies/:company_id/couriers/get-storages", get(storages))
        .route("/companies/:company_id/couriers/:courier_id", patch(update_courier))
        .route(
            "/companies/:company_id/couriers/:courier_id/routes-orders",
            get(routes_orders),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes/:route_id/docs",
            get(route_docs),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes/:route_id/courier-on-way",
            patch(courier_on_way),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes/:route_id/courier-accepted",
            patch(courier_accepted),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes-orders/:order_delivery_id/qr-code",
            post(courier_took),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes-orders/courier-on-point",
            patch(courier_on_point),
        )
        .route(
            "/companies/:company_id/couriers/:courier_id/routes-orders/delivered",
            patch(delivered),
        )
}

// ── Dispatcher list ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourierSearch {
    q: Option<String>,
    query_by: Option<String>,
    filter_by: Option<String>,
    sort_by: Option<String>,
    facet_by: Option<String>,
}

impl CourierSearch {
    /// Search restricted to one company's documents.
    fn into_query(self, company_id: Uuid, paging: PageParams) -> SearchQuery {
        // Search reports its own total, so only the page and size matter here.
        let descriptor = paging.paginate(0);
        SearchQuery {
            q: self.q.unwrap_or_default(),
            query_by: self.query_by.unwrap_or_default(),
            filter_by: self.filter_by,
            sort_by: self.sort_by,
            facet_by: self.facet_by,
            page: descriptor.page,
            per_page: descriptor.per_page,
        }
        .with_filter(&format!("companyId:={company_id}"))
        .normalized()
    }
}

async fn search_couriers(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiQuery(search): ApiQuery<CourierSearch>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let client = state.search()?;
    let query = search.into_query(company_id, paging);
    let result = client
        .search::<Value>(client.courier_collection(), &query)
        .await?;

    let relation = Relation::root("driver", &[]).join(Relation::nested("user", "user", &[]));
    let fields = state.catalog()?.describe_joined(&relation).await?;

    Ok(Json(ResponseEnvelope::from_search(result, fields)))
}

// ── Courier app reads ───────────────────────────────────────────────────────

async fn storages(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Value>>, AppError> {
    let storages = db::storages::list_with_coordinate(state.db()?, company_id).await?;
    Ok(Json(storages))
}

#[derive(Debug, Default, Deserialize)]
struct RoutesOrdersQuery {
    inactive: Option<String>,
}

async fn routes_orders(
    State(state): State<AppState>,
    ApiPath((company_id, courier_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(query): ApiQuery<RoutesOrdersQuery>,
) -> Result<Json<CourierRoutes>, AppError> {
    let inactive = courier_board::parse_statuses(query.inactive.as_deref());
    let routes =
        courier_board::courier_routes(state.db()?, company_id, courier_id, &inactive).await?;
    Ok(Json(routes))
}

async fn route_docs(
    State(state): State<AppState>,
    ApiPath((company_id, _courier_id, route_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let route = db::couriers::route_documents(state.db()?, company_id, route_id)
        .await?
        .ok_or_else(|| AppError::not_found("Route not found"))?;
    Ok(Json(courier_board::documents(route)))
}

// ── Courier app writes ──────────────────────────────────────────────────────

async fn update_courier(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, courier_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = ums::DriverUpdate {
        body,
        id: courier_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn courier_on_way(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, _courier_id, route_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    forward(&state, &ctx, &tms::RouteCourierOnWay::new(route_id.to_string())).await
}

async fn courier_accepted(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, _courier_id, route_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let op = tms::RouteCourierAccepted {
        id: route_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

async fn courier_took(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, _courier_id, order_delivery_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    let op = tms::OrderDeliveryCourierTook {
        body,
        id: order_delivery_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

#[derive(Debug, Deserialize)]
struct DeliveryIds {
    ids: Vec<String>,
}

async fn courier_on_point(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, _courier_id)): ApiPath<(Uuid, Uuid)>,
    body: Result<Json<DeliveryIds>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let DeliveryIds { ids } = extract_json(body)?;
    if ids.is_empty() {
        return Err(AppError::bad_request("ids must not be empty"));
    }
    forward(&state, &ctx, &tms::OrderDeliveryCourierOnPoint { ids }).await
}

async fn delivered(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, _courier_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    forward(&state, &ctx, &tms::OrderDeliveryDelivered { body }).await
}
