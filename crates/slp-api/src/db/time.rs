//! Time zone conversions delegated to PostgreSQL's tz database.
//!
//! Callers send wall-clock values in the IANA zone of their `TZ` header.
//! Clock times (`HH:MM`) are anchored on 2000-01-01 before conversion so
//! the offset applied is that zone's offset on that date.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use sqlx::PgPool;

/// Whether PostgreSQL knows the zone name.
pub async fn zone_exists(pool: &PgPool, tz: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_timezone_names WHERE name = $1)")
        .bind(tz)
        .fetch_one(pool)
        .await
}

/// Local clock time in `tz` to the UTC clock time, both `HH:MM`.
pub async fn clock_to_utc(pool: &PgPool, local: NaiveTime, tz: &str) -> Result<String, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT to_char(((DATE '2000-01-01' + $1::time) AT TIME ZONE $2) AT TIME ZONE 'UTC', 'HH24:MI')",
    )
    .bind(local)
    .bind(tz)
    .fetch_one(pool)
    .await
}

/// Wall-clock timestamp in `tz` to a UTC instant.
pub async fn timestamp_to_utc(
    pool: &PgPool,
    local: NaiveDateTime,
    tz: &str,
) -> Result<DateTime<Utc>, sqlx::Error> {
    sqlx::query_scalar("SELECT ($1::timestamp AT TIME ZONE $2)")
        .bind(local)
        .bind(tz)
        .fetch_one(pool)
        .await
}
