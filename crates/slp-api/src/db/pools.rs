//! Pool reads: the dispatcher's pool list and the legs behind a pool
//! aggregate.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{camelized, push_page, to_count};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolFilter {
    pub status: Option<String>,
    pub storage_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, f: &PoolFilter) {
    qb.push(" FROM pool p LEFT JOIN storage st ON st.id = p.storage_id");
    qb.push(" WHERE p.company_id = ").push_bind(company_id);
    if let Some(status) = &f.status {
        qb.push(" AND p.status::text = ").push_bind(status.clone());
    }
    if let Some(name) = &f.storage_name {
        qb.push(" AND st.name = ").push_bind(name.clone());
    }
    if let Some(from) = f.from {
        qb.push(" AND p.created_at >= ").push_bind(from);
    }
    if let Some(to) = f.to {
        qb.push(" AND p.created_at <= ").push_bind(to);
    }
}

pub async fn count(pool: &PgPool, company_id: Uuid, filter: &PoolFilter) -> Result<u64, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    push_filter(&mut qb, company_id, filter);
    let n: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(to_count(n))
}

/// Pools with their storage, newest first.
pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    filter: &PoolFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(p) || jsonb_build_object('storage', to_jsonb(st))");
    push_filter(&mut qb, company_id, filter);
    qb.push(" ORDER BY p.created_at DESC");
    push_page(&mut qb, limit, offset);
    let rows: Vec<Value> = qb.build_query_scalar().fetch_all(pool).await?;
    Ok(camelized(rows))
}

/// Storage the pool is dispatched from, if the pool belongs to the company.
pub async fn storage_of(
    pool: &PgPool,
    company_id: Uuid,
    pool_id: Uuid,
) -> Result<Option<Option<Uuid>>, sqlx::Error> {
    sqlx::query_scalar("SELECT p.storage_id FROM pool p WHERE p.id = $1 AND p.company_id = $2")
        .bind(pool_id)
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

/// Legs of a pool with their order (dimension, recipient, sender), route
/// number and endpoints. A leg without an act falls back to the order's
/// first act.
pub async fn legs(pool: &PgPool, pool_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(od) || jsonb_build_object(
            'document_act_id', COALESCE(
                od.document_act_id,
                (SELECT da.id FROM document_act da WHERE da.order_id = od.order_id LIMIT 1)
            ),
            'route', CASE WHEN rt.id IS NULL THEN NULL ELSE jsonb_build_object('number', rt.number) END,
            'from', to_jsonb(fp),
            'to', to_jsonb(tp),
            'order', to_jsonb(o) || jsonb_build_object(
                'dimension', to_jsonb(d),
                'recipient', to_jsonb(r),
                'sender', to_jsonb(s)
            )
        )
        FROM pool_order_delivery pod
        JOIN order_delivery od ON od.id = pod.order_delivery_id
        JOIN "order" o ON o.id = od.order_id
        LEFT JOIN dimension d ON d.id = o.dimension_id
        LEFT JOIN recipient r ON r.id = o.recipient_id
        LEFT JOIN sender s ON s.id = o.sender_id
        LEFT JOIN route rt ON rt.id = od.route_id
        JOIN point fp ON fp.id = od.from_point_id
        JOIN point tp ON tp.id = od.to_point_id
        WHERE pod.pool_id = $1
        ORDER BY od.position ASC NULLS LAST"#,
    )
    .bind(pool_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_name_filter_joins_storage() {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        let filter = PoolFilter {
            storage_name: Some("Central".into()),
            ..PoolFilter::default()
        };
        push_filter(&mut qb, Uuid::nil(), &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM pool p LEFT JOIN storage st ON st.id = p.storage_id \
             WHERE p.company_id = $1 AND st.name = $2"
        );
    }
}
