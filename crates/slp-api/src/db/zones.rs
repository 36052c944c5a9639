//! Zone reads.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::camelized;

pub async fn list(pool: &PgPool, company_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(z) FROM zone z WHERE z.company_id = $1 ORDER BY z.created_at",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn get(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(z) FROM zone z WHERE z.id = $1 AND z.company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

/// Geo place id behind a zone.
pub async fn geo_id(pool: &PgPool, id: Uuid) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT z.geo_id::text FROM zone z WHERE z.id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Storages placed in any of the zones.
pub async fn storages_in(pool: &PgPool, zone_ids: &[Uuid]) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(st) FROM storage st WHERE st.zone_id = ANY($1)",
    )
    .bind(zone_ids)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}
