//! Storage (DC and PUP) reads and the checks run before a storage is
//! created or a driver is attached to one.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::camelized;

/// Storage types.
pub const TYPE_DC: &str = "DC";
pub const TYPE_PUP: &str = "PUP";

pub async fn list(pool: &PgPool, company_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(st) FROM storage st WHERE st.company_id = $1 ORDER BY st.name",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

/// Storages with `latitude`/`longitude` folded into a `coordinate` object.
pub async fn list_with_coordinate(pool: &PgPool, company_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT (to_jsonb(st) - 'latitude' - 'longitude') || jsonb_build_object(\
            'coordinate', jsonb_build_object('latitude', st.latitude, 'longitude', st.longitude)) \
         FROM storage st WHERE st.company_id = $1 ORDER BY st.name",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn get(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(st) FROM storage st WHERE st.id = $1 AND st.company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

/// Name of a storage.
pub async fn name(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT st.name FROM storage st WHERE st.id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Type label of a storage.
pub async fn storage_type(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT st.type::text FROM storage st WHERE st.id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Depot coordinates. The outer `None` means no such storage.
pub async fn coordinates(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<(Option<f64>, Option<f64>)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT st.latitude::float8, st.longitude::float8 FROM storage st WHERE st.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Is there a DC serving the zone?
pub async fn zone_has_dc(pool: &PgPool, zone_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM storage st WHERE st.zone_id = $1 AND st.type::text = $2)",
    )
    .bind(zone_id)
    .bind(TYPE_DC)
    .fetch_one(pool)
    .await
}

/// Does any storage reference the zone?
pub async fn zone_in_use(pool: &PgPool, zone_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM storage st WHERE st.zone_id = $1)")
        .bind(zone_id)
        .fetch_one(pool)
        .await
}
