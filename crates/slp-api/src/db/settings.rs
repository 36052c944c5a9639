//! Per-company settings.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// The two settings the aggregates need.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct ServeSettings {
    /// Seconds spent at each stop.
    pub point_serve_time: f64,
    /// Divisor turning volume into dimensional weight.
    pub density: f64,
}

pub async fn get(pool: &PgPool, company_id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(cs) FROM company_settings cs WHERE cs.company_id = $1",
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

pub async fn serve_settings(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Option<ServeSettings>, sqlx::Error> {
    sqlx::query_as(
        "SELECT cs.point_serve_time::float8 AS point_serve_time, cs.density::float8 AS density \
         FROM company_settings cs WHERE cs.company_id = $1",
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await
}
