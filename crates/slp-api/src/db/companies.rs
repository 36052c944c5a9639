//! Company reads.

use serde_json::Value;
use sqlx::PgPool;

use super::{camelized, to_count};

pub async fn count(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company")
        .fetch_one(pool)
        .await?;
    Ok(to_count(n))
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(c) FROM company c ORDER BY c.created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}
