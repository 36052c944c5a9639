//! # Database Read Layer
//!
//! The gateway reads PostgreSQL directly and never writes to it; every write
//! goes through a backend service. The database is **optional**: when
//! `DATABASE_URL` is unset the service still starts and every read endpoint
//! answers 503.
//!
//! Rows are selected as `jsonb` (`to_jsonb(row) || jsonb_build_object(...)`
//! for joined relations) and their keys camelized on the way out, so the
//! route layer can flatten them straight into dot-path table rows whose
//! names match the [`catalog`] descriptors.
//!
//! Reserved table names (`"order"`, `"user"`) are always quoted.

pub mod catalog;
pub mod companies;
pub mod couriers;
pub mod docs;
pub mod drivers;
pub mod orders;
pub mod planners;
pub mod pools;
pub mod routes;
pub mod settings;
pub mod storages;
pub mod tariffs;
pub mod time;
pub mod users;
pub mod vehicles;
pub mod zones;

use serde_json::Value;
use slp_core::camelize_columns;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

/// Initialize the database connection pool.
///
/// Returns `None` if `DATABASE_URL` is not set.
/// Returns `Err` if the URL is set but the connection fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Read endpoints will return 503.");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");
    Ok(Some(pool))
}

/// Columns stored as `jsonb`. Their contents are returned as stored.
pub(crate) const JSONB_COLUMNS: &[&str] = &["working_days", "properties", "images", "phones"];

/// Camelize the column and relation keys of one `jsonb` row.
pub(crate) fn camelize_row(row: Value) -> Value {
    camelize_columns(row, JSONB_COLUMNS)
}

/// Camelize the column and relation keys of every `jsonb` row.
pub(crate) fn camelized(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter().map(camelize_row).collect()
}

/// `COUNT(*)` results are never negative.
pub(crate) fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

/// Append `LIMIT`/`OFFSET` binds.
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, limit: i64, offset: i64) {
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
}

/// Fetch every row of a parameterless `jsonb` query.
pub(crate) async fn all_rows(
    pool: &PgPool,
    sql: &'static str,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(sql).fetch_all(pool).await?;
    Ok(camelized(rows))
}
