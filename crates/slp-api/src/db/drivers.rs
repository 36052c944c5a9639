//! Driver reads.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{camelized, to_count};

pub async fn count(pool: &PgPool, company_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM driver dr WHERE dr.company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await?;
    Ok(to_count(n))
}

/// Drivers with their vehicle, user and home storage.
pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(dr) || jsonb_build_object(
            'vehicle', to_jsonb(v),
            'user', to_jsonb(u),
            'storage', to_jsonb(st)
        )
        FROM driver dr
        LEFT JOIN vehicle v ON v.driver_id = dr.id
        LEFT JOIN "user" u ON u.id = dr.user_id
        LEFT JOIN storage st ON st.id = dr.dc_id
        WHERE dr.company_id = $1
        ORDER BY dr.created_at DESC
        LIMIT $2 OFFSET $3"#,
    )
    .bind(company_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

/// Drivers without a vehicle.
pub async fn available(pool: &PgPool, company_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(dr) FROM driver dr \
         WHERE dr.company_id = $1 AND dr.vehicle_id IS NULL \
         ORDER BY dr.created_at DESC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

pub async fn get(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(dr) FROM driver dr WHERE dr.id = $1 AND dr.company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

/// The driver's user record plus the plate number of the vehicle they
/// drive, as shown next to a route.
pub async fn courier_card(pool: &PgPool, driver_id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT COALESCE(to_jsonb(u), '{}'::jsonb) || jsonb_build_object(
            'plate_number', (SELECT v.plate_number FROM vehicle v WHERE v.driver_id = dr.id LIMIT 1)
        )
        FROM driver dr
        LEFT JOIN "user" u ON u.id = dr.user_id
        WHERE dr.id = $1"#,
    )
    .bind(driver_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}
