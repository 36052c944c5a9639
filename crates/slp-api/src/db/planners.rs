//! Route planner reads.
//!
//! `start_time` is stored in UTC. It is rendered as `HH:MM` in the caller's
//! zone after moving it onto 2000-01-01, so the offset applied is the zone's
//! offset on that date rather than today's.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{camelized, to_count};

pub async fn count(pool: &PgPool, company_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM route_planner rp WHERE rp.company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await?;
    Ok(to_count(n))
}

pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    tz: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT jsonb_build_object(\
            'id', rp.id, \
            'company_id', rp.company_id, \
            'start_time', to_char(((DATE '2000-01-01' + rp.start_time::time) AT TIME ZONE 'UTC') AT TIME ZONE $2, 'HH24:MI')) \
         FROM route_planner rp WHERE rp.company_id = $1 \
         ORDER BY rp.start_time::time LIMIT $3 OFFSET $4",
    )
    .bind(company_id)
    .bind(tz)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn get(
    pool: &PgPool,
    company_id: Uuid,
    id: Uuid,
    tz: &str,
) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT jsonb_build_object(\
            'id', rp.id, \
            'company_id', rp.company_id, \
            'start_time', to_char(((DATE '2000-01-01' + rp.start_time::time) AT TIME ZONE 'UTC') AT TIME ZONE $3, 'HH24:MI')) \
         FROM route_planner rp WHERE rp.id = $1 AND rp.company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .bind(tz)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}
