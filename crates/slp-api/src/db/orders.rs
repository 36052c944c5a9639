//! Order reads.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{camelized, push_page, to_count};

/// Filters of the company order list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub external_number: Option<String>,
    pub number: Option<i32>,
    pub pool_number: Option<i32>,
    pub sender_dc_id: Option<Uuid>,
    pub recipient_dc_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

const LIST_FROM: &str = r#" FROM "order" o
    LEFT JOIN sender s ON s.id = o.sender_id
    LEFT JOIN recipient r ON r.id = o.recipient_id
    LEFT JOIN pool p ON p.id = o.pool_id"#;

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, f: &OrderFilter) {
    qb.push(" WHERE o.company_id = ").push_bind(company_id);
    if let Some(status) = &f.status {
        qb.push(" AND o.status::text = ").push_bind(status.clone());
    }
    if let Some(external_number) = &f.external_number {
        qb.push(" AND o.external_number = ")
            .push_bind(external_number.clone());
    }
    if let Some(number) = f.number {
        qb.push(" AND o.number = ").push_bind(number);
    }
    if let Some(pool_number) = f.pool_number {
        qb.push(" AND p.number = ").push_bind(pool_number);
    }
    if let Some(dc_id) = f.sender_dc_id {
        qb.push(" AND s.dc_id = ").push_bind(dc_id);
    }
    if let Some(dc_id) = f.recipient_dc_id {
        qb.push(" AND r.dc_id = ").push_bind(dc_id);
    }
    if let Some(from) = f.from {
        qb.push(" AND o.created_at >= ").push_bind(from);
    }
    if let Some(to) = f.to {
        qb.push(" AND o.created_at <= ").push_bind(to);
    }
}

pub async fn count(pool: &PgPool, company_id: Uuid, filter: &OrderFilter) -> Result<u64, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    qb.push(LIST_FROM);
    push_filter(&mut qb, company_id, filter);
    let n: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(to_count(n))
}

/// Orders with sender, recipient, pool and the number of the route carrying
/// their latest leg, newest first.
pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    filter: &OrderFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let mut qb = QueryBuilder::new(
        r#"SELECT to_jsonb(o) || jsonb_build_object(
            'sender', to_jsonb(s),
            'recipient', to_jsonb(r),
            'pool', to_jsonb(p),
            'route_number', (
                SELECT rt.number FROM order_delivery od
                JOIN route rt ON rt.id = od.route_id
                WHERE od.order_id = o.id
                ORDER BY od.position DESC NULLS LAST
                LIMIT 1
            )
        )"#,
    );
    qb.push(LIST_FROM);
    push_filter(&mut qb, company_id, filter);
    qb.push(" ORDER BY o.created_at DESC");
    push_page(&mut qb, limit, offset);

    let rows: Vec<Value> = qb.build_query_scalar().fetch_all(pool).await?;
    Ok(camelized(rows))
}

/// Order with sender, recipient and dimension.
pub async fn detail(
    pool: &PgPool,
    company_id: Uuid,
    order_id: Uuid,
) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(o) || jsonb_build_object(
            'sender', to_jsonb(s),
            'recipient', to_jsonb(r),
            'dimension', to_jsonb(d)
        )
        FROM "order" o
        LEFT JOIN sender s ON s.id = o.sender_id
        LEFT JOIN recipient r ON r.id = o.recipient_id
        LEFT JOIN dimension d ON d.id = o.dimension_id
        WHERE o.id = $1 AND o.company_id = $2"#,
    )
    .bind(order_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

/// Public card of an order looked up by its hand-over code.
pub async fn by_code(pool: &PgPool, company_id: Uuid, code: &str) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT jsonb_build_object(
            'number', o.number,
            'name', o.name,
            'images', o.images,
            'dimension', to_jsonb(d)
        )
        FROM "order" o
        LEFT JOIN dimension d ON d.id = o.dimension_id
        WHERE o.code = $1 AND o.company_id = $2"#,
    )
    .bind(code)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

pub async fn by_external_number(
    pool: &PgPool,
    company_id: Uuid,
    external_number: &str,
) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(o) FROM "order" o
        WHERE o.external_number = $1 AND o.company_id = $2
        ORDER BY o.created_at DESC
        LIMIT 1"#,
    )
    .bind(external_number)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

pub async fn properties(
    pool: &PgPool,
    company_id: Uuid,
    order_id: Uuid,
) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Option<Value>> = sqlx::query_scalar(
        r#"SELECT o.properties::jsonb FROM "order" o WHERE o.id = $1 AND o.company_id = $2"#,
    )
    .bind(order_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|p| p.unwrap_or(Value::Null)))
}

/// Storage id behind a numeric partner point id.
pub async fn storage_for_point(pool: &PgPool, point_id: i32) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT sp.storage_id FROM sello_point sp WHERE sp.id = $1")
        .bind(point_id)
        .fetch_optional(pool)
        .await
}

// -- Self-delivery orders of a DC ---------------------------------------------

pub async fn count_self_delivery(pool: &PgPool, storage_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM "order" o WHERE o.storage_id = $1 AND o.self_delivery = true"#,
    )
    .bind(storage_id)
    .fetch_one(pool)
    .await?;
    Ok(to_count(n))
}

/// Orders collected by the customer at the DC, highest number first.
pub async fn list_self_delivery(
    pool: &PgPool,
    storage_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(o) || jsonb_build_object(
            'sender', to_jsonb(s),
            'recipient', to_jsonb(r),
            'pool', to_jsonb(p),
            'dimension', to_jsonb(d)
        )
        FROM "order" o
        LEFT JOIN sender s ON s.id = o.sender_id
        LEFT JOIN recipient r ON r.id = o.recipient_id
        LEFT JOIN pool p ON p.id = o.pool_id
        LEFT JOIN dimension d ON d.id = o.dimension_id
        WHERE o.storage_id = $1 AND o.self_delivery = true
        ORDER BY o.number DESC
        LIMIT $2 OFFSET $3"#,
    )
    .bind(storage_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}
