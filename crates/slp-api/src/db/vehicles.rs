//! Vehicle, mileage and fleet catalog reads.

use serde_json::Value;
use slp_rpc_client::ops::fms::FleetCatalog;
use sqlx::PgPool;
use uuid::Uuid;

use super::{all_rows, camelized, to_count};

pub async fn count(pool: &PgPool, company_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicle v WHERE v.company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await?;
    Ok(to_count(n))
}

pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(v) FROM vehicle v WHERE v.company_id = $1 \
         ORDER BY v.created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(company_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn mileages(pool: &PgPool) -> Result<Vec<Value>, sqlx::Error> {
    all_rows(pool, "SELECT to_jsonb(vm) FROM vehicle_mileage vm ORDER BY vm.created_at DESC").await
}

/// Every row of a fleet catalog.
pub async fn catalog(pool: &PgPool, catalog: FleetCatalog) -> Result<Vec<Value>, sqlx::Error> {
    // Table names come from a closed enum, never from the request.
    let sql = format!("SELECT to_jsonb(c) FROM {} c ORDER BY c.id", catalog.table());
    let rows: Vec<Value> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(camelized(rows))
}
