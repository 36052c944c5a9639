//! # Pool and Route Aggregates
//!
//! Both reads load the legs of a pool or route, ask the geo matrix for the
//! tour through their stops starting and ending at the depot, and add up
//! weight, volume, dimensional weight, distance and serve time.
//!
//! The matrix target of a leg is where the courier has to go: the origin of
//! a first-mile pickup, the destination of anything else. The matrix is
//! never retried and its answer never cached; any failure is a 400.

use serde_json::Value;
use slp_core::aggregate::{chain_legs, compute_totals, StoredLeg, FIRST_MILE};
use slp_core::{
    flatten_rows, ActionType, CourierEnvelope, Dimension, FieldDescriptor, FieldType, LegPoint,
    OffsetPage, ResponseEnvelope, RouteTotals, TotalsEnvelope,
};
use slp_rpc_client::{GeoPoint, MatrixClient, MatrixRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::catalog::{Introspector, Relation};
use crate::db::settings::ServeSettings;
use crate::error::AppError;
use crate::extractors::PageParams;

const POOL_LEG_EXCLUDES: &[&str] = &["route_id", "pool_id", "from_point_id", "to_point_id"];

const POOL_ORDER_EXCLUDES: &[&str] = &[
    "external_number",
    "external_id",
    "box_id",
    "is_canceled",
    "dimension_id",
    "price",
    "factor",
    "updated_at",
    "created_at",
    "note",
    "status",
    "fragile",
    "recipient_not_available",
    "company_id",
    "cell_code",
    "code",
    "storage_id",
    "order_group_id",
    "pool_id",
];

/// Keys kept nested when a pool leg is flattened.
const POOL_ROW_KEEP: &[&str] = &["to", "from", "dimensions", "phones", "deliveryStartAt"];

/// Keys kept nested when a route hop is flattened.
const ROUTE_ROW_KEEP: &[&str] = &["from", "to", "dimensions"];

pub type PoolOrders = TotalsEnvelope<Value, RouteTotals>;
pub type RouteOrders = CourierEnvelope<Value, RouteTotals, Value>;

// ── Leg helpers ─────────────────────────────────────────────────────────────

fn point(leg: &Value, key: &str) -> Result<LegPoint, AppError> {
    serde_json::from_value(leg.get(key).cloned().unwrap_or(Value::Null))
        .map_err(|e| AppError::Internal(format!("leg without a valid '{key}' point: {e}")))
}

fn dimension(leg: &Value) -> Dimension {
    leg.pointer("/order/dimension")
        .cloned()
        .and_then(|d| serde_json::from_value(d).ok())
        .unwrap_or_default()
}

/// Stop the courier has to reach for a leg.
pub fn matrix_target(leg: &Value) -> Result<GeoPoint, AppError> {
    let key = if leg.get("mileType").and_then(Value::as_str) == Some(FIRST_MILE) {
        "from"
    } else {
        "to"
    };
    let p = point(leg, key)?;
    Ok(GeoPoint::new(p.latitude, p.longitude))
}

async fn totals(
    matrix: &MatrixClient,
    depot: (Option<f64>, Option<f64>),
    legs: &[Value],
    settings: ServeSettings,
) -> Result<RouteTotals, AppError> {
    let targets = legs.iter().map(matrix_target).collect::<Result<Vec<_>, _>>()?;
    let request = MatrixRequest::for_depot(depot.0, depot.1, targets);

    let response = matrix.compute(&request).await.map_err(|e| {
        tracing::warn!(error = %e, "geo matrix call failed");
        AppError::BadRequest(format!("geo matrix failed: {e}"))
    })?;

    let dimensions: Vec<Dimension> = legs.iter().map(dimension).collect();
    Ok(compute_totals(
        &dimensions,
        &response.durations(),
        settings.point_serve_time,
        settings.density,
        response.total_distance,
    ))
}

async fn depot(pool: &PgPool, storage_id: Option<Uuid>) -> Result<(Option<f64>, Option<f64>), AppError> {
    let Some(storage_id) = storage_id else {
        return Err(AppError::not_found("Storage not found"));
    };
    db::storages::coordinates(pool, storage_id)
        .await?
        .ok_or_else(|| AppError::not_found("Storage not found"))
}

async fn serve_settings(pool: &PgPool, company_id: Uuid) -> Result<ServeSettings, AppError> {
    db::settings::serve_settings(pool, company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company settings not found"))
}

/// Tag each pool leg with what the courier does at its destination.
pub fn tag_pool_actions(legs: &mut [Value]) -> Result<(), AppError> {
    for leg in legs.iter_mut() {
        let action = ActionType::for_destination(&point(leg, "to")?.point_type);
        if let Some(map) = leg.as_object_mut() {
            map.insert("actionType".into(), Value::String(action.as_str().into()));
        }
    }
    Ok(())
}

// ── Pool ────────────────────────────────────────────────────────────────────

pub async fn pool_fields(catalog: &Introspector) -> Result<Vec<FieldDescriptor>, AppError> {
    let relation = Relation::root("order_delivery", POOL_LEG_EXCLUDES)
        .join(Relation::nested("order", "order", POOL_ORDER_EXCLUDES));
    let mut fields = catalog.describe_joined(&relation).await?;
    fields.push(FieldDescriptor::synthetic("actionType", FieldType::String, true));
    fields.push(FieldDescriptor::synthetic(
        "order.recipient.street",
        FieldType::String,
        true,
    ));
    Ok(fields)
}

/// Legs of a pool, one page of them, and the totals over all of them.
pub async fn pool_orders(
    pool: &PgPool,
    catalog: &Introspector,
    matrix: &MatrixClient,
    company_id: Uuid,
    pool_id: Uuid,
    paging: PageParams,
) -> Result<PoolOrders, AppError> {
    let storage_id = db::pools::storage_of(pool, company_id, pool_id)
        .await?
        .ok_or_else(|| AppError::not_found("Pool not found"))?;

    let mut legs = db::pools::legs(pool, pool_id).await?;
    let depot = depot(pool, storage_id).await?;
    let settings = serve_settings(pool, company_id).await?;
    let total = totals(matrix, depot, &legs, settings).await?;

    tag_pool_actions(&mut legs)?;
    let rows = flatten_rows(&legs, POOL_ROW_KEEP);
    let descriptor = paging.paginate(rows.len() as u64);
    let data = descriptor.slice(rows);
    let fields = pool_fields(catalog).await?;

    Ok(TotalsEnvelope {
        envelope: ResponseEnvelope::from_offset(OffsetPage::from_descriptor(
            data,
            fields,
            &descriptor,
        )),
        total,
    })
}

// ── Route ───────────────────────────────────────────────────────────────────

/// Chain stored route legs into the closed tour shown to dispatchers.
pub fn tour_rows(legs: &[Value]) -> Result<Vec<Value>, AppError> {
    let stored = legs
        .iter()
        .map(|leg| {
            Ok(StoredLeg {
                from: point(leg, "from")?,
                to: point(leg, "to")?,
                order: leg.get("order").cloned().unwrap_or(Value::Null),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let tour = chain_legs(&stored)
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(format!("tour serialization: {e}")))?;
    Ok(flatten_rows(&tour, ROUTE_ROW_KEEP))
}

/// The closed tour of a route with totals and the assigned courier.
pub async fn route_orders(
    pool: &PgPool,
    matrix: &MatrixClient,
    company_id: Uuid,
    route_id: Uuid,
) -> Result<RouteOrders, AppError> {
    let header = db::routes::header(pool, company_id, route_id)
        .await?
        .ok_or_else(|| AppError::not_found("Route not found"))?;
    let driver_id = header
        .driver_id
        .ok_or_else(|| AppError::not_found("Driver not found"))?;
    let courier = db::drivers::courier_card(pool, driver_id)
        .await?
        .ok_or_else(|| AppError::not_found("Driver not found"))?;

    let legs = db::routes::tour_legs(pool, route_id).await?;
    let data = tour_rows(&legs)?;

    let depot = depot(pool, header.storage_id).await?;
    let settings = serve_settings(pool, company_id).await?;
    let total = totals(matrix, depot, &legs, settings).await?;

    Ok(CourierEnvelope {
        envelope: ResponseEnvelope::from_offset(OffsetPage::single(data, Vec::new())),
        total,
        courier,
    })
}
