//! Tariff reads.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{camelized, to_count};

pub async fn count(pool: &PgPool, company_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tariff t WHERE t.company_id = $1")
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
        "SELECT to_jsonb(t) FROM tariff t WHERE t.company_id = $1 \
         ORDER BY t.created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(company_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn get(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(t) FROM tariff t WHERE t.id = $1 AND t.company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}
