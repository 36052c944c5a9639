//! Route reads. Routes belong to a company through their pool.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{camelized, push_page, to_count};

/// Status of a finished route.
pub const STATUS_DELIVERED: &str = "DELIVERED";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub number: Option<i32>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Only routes that are not delivered yet.
    pub active: bool,
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, company_id: Uuid, f: &RouteFilter) {
    qb.push(
        " FROM route rt JOIN pool p ON p.id = rt.pool_id \
         LEFT JOIN storage st ON st.id = rt.storage_id",
    );
    qb.push(" WHERE p.company_id = ").push_bind(company_id);
    if let Some(number) = f.number {
        qb.push(" AND rt.number = ").push_bind(number);
    }
    if f.active {
        qb.push(" AND rt.status::text <> ").push_bind(STATUS_DELIVERED);
    } else if let Some(status) = &f.status {
        qb.push(" AND rt.status::text = ").push_bind(status.clone());
    }
    if let Some(from) = f.from {
        qb.push(" AND rt.created_at >= ").push_bind(from);
    }
    if let Some(to) = f.to {
        qb.push(" AND rt.created_at <= ").push_bind(to);
    }
}

pub async fn count(pool: &PgPool, company_id: Uuid, filter: &RouteFilter) -> Result<u64, sqlx::Error> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    push_filter(&mut qb, company_id, filter);
    let n: i64 = qb.build_query_scalar().fetch_one(pool).await?;
    Ok(to_count(n))
}

/// Routes with pool and storage, newest first. `name` is the storage name.
/// `page` of `None` returns every match.
pub async fn list(
    pool: &PgPool,
    company_id: Uuid,
    filter: &RouteFilter,
    page: Option<(i64, i64)>,
) -> Result<Vec<Value>, sqlx::Error> {
    let mut qb = QueryBuilder::new(
        "SELECT to_jsonb(rt) || jsonb_build_object(\
         'pool', to_jsonb(p), 'storage', to_jsonb(st), 'name', st.name)",
    );
    push_filter(&mut qb, company_id, filter);
    qb.push(" ORDER BY rt.created_at DESC");
    if let Some((limit, offset)) = page {
        push_page(&mut qb, limit, offset);
    }
    let rows: Vec<Value> = qb.build_query_scalar().fetch_all(pool).await?;
    Ok(camelized(rows))
}

// ── Legs of one route ───────────────────────────────────────────────────────

pub async fn count_legs(pool: &PgPool, company_id: Uuid, route_id: Uuid) -> Result<u64, sqlx::Error> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_delivery od \
         JOIN route rt ON rt.id = od.route_id \
         JOIN pool p ON p.id = rt.pool_id \
         WHERE od.route_id = $1 AND p.company_id = $2",
    )
    .bind(route_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    Ok(to_count(n))
}

/// One page of a route's legs with endpoints, order (sender, recipient),
/// route number, TTN id and act id (falling back to the order's first act).
pub async fn legs_page(
    pool: &PgPool,
    company_id: Uuid,
    route_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(od) || jsonb_build_object(
            'document_act_id', COALESCE(
                od.document_act_id,
                (SELECT da.id FROM document_act da WHERE da.order_id = od.order_id LIMIT 1)
            ),
            'document_ttn_id', (SELECT dt.id FROM document_ttn dt WHERE dt.order_id = od.order_id LIMIT 1),
            'route', jsonb_build_object('number', rt.number),
            'from', to_jsonb(fp),
            'to', to_jsonb(tp),
            'order', to_jsonb(o) || jsonb_build_object(
                'sender', to_jsonb(s),
                'recipient', to_jsonb(r)
            )
        )
        FROM order_delivery od
        JOIN route rt ON rt.id = od.route_id
        JOIN pool p ON p.id = rt.pool_id
        JOIN "order" o ON o.id = od.order_id
        LEFT JOIN sender s ON s.id = o.sender_id
        LEFT JOIN recipient r ON r.id = o.recipient_id
        JOIN point fp ON fp.id = od.from_point_id
        JOIN point tp ON tp.id = od.to_point_id
        WHERE od.route_id = $1 AND p.company_id = $2
        ORDER BY od.position ASC NULLS LAST
        LIMIT $3 OFFSET $4"#,
    )
    .bind(route_id)
    .bind(company_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows).into_iter().map(ttn_key).collect())
}

/// The UI reads the TTN id as `documentTTNId`.
fn ttn_key(mut row: Value) -> Value {
    if let Some(map) = row.as_object_mut() {
        if let Some(id) = map.remove("documentTtnId") {
            map.insert("documentTTNId".into(), id);
        }
    }
    row
}

// ── Route aggregate ─────────────────────────────────────────────────────────

/// What the route aggregate needs to know about the route itself.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RouteHeader {
    pub storage_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
}

pub async fn header(
    pool: &PgPool,
    company_id: Uuid,
    route_id: Uuid,
) -> Result<Option<RouteHeader>, sqlx::Error> {
    sqlx::query_as(
        "SELECT p.storage_id, v.driver_id \
         FROM route rt \
         JOIN pool p ON p.id = rt.pool_id \
         LEFT JOIN vehicle v ON v.id = rt.vehicle_id \
         WHERE rt.id = $1 AND p.company_id = $2",
    )
    .bind(route_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

/// Legs of a route in tour order, with endpoints and the order's dimension.
pub async fn tour_legs(pool: &PgPool, route_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT jsonb_build_object(
            'mile_type', od.mile_type,
            'from', to_jsonb(fp),
            'to', to_jsonb(tp),
            'order', jsonb_build_object('dimension', to_jsonb(d))
        )
        FROM order_delivery od
        JOIN "order" o ON o.id = od.order_id
        LEFT JOIN dimension d ON d.id = o.dimension_id
        JOIN point fp ON fp.id = od.from_point_id
        JOIN point tp ON tp.id = od.to_point_id
        WHERE od.route_id = $1
        ORDER BY od.position ASC NULLS LAST"#,
    )
    .bind(route_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql(filter: &RouteFilter) -> String {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        push_filter(&mut qb, Uuid::nil(), filter);
        qb.sql().to_string()
    }

    #[test]
    fn active_excludes_delivered_and_ignores_status() {
        let s = sql(&RouteFilter {
            status: Some("ROUTED".into()),
            active: true,
            ..RouteFilter::default()
        });
        assert!(s.contains("rt.status::text <> $2"));
        assert!(!s.contains("rt.status::text = "));
    }

    #[test]
    fn ttn_id_keeps_its_acronym() {
        let row = ttn_key(serde_json::json!({"id": "od1", "documentTtnId": "t1"}));
        assert_eq!(row, serde_json::json!({"id": "od1", "documentTTNId": "t1"}));
    }

    #[test]
    fn routes_are_scoped_through_their_pool() {
        let s = sql(&RouteFilter::default());
        assert!(s.contains("JOIN pool p ON p.id = rt.pool_id"));
        assert!(s.ends_with("WHERE p.company_id = $1"));
    }
}
