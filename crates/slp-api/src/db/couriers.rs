//! Courier app reads: the routes assigned to a courier's vehicle and the
//! document summary of one route.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::camelized;

/// The courier and the vehicle they drive.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CourierShift {
    pub vehicle_id: Option<Uuid>,
    /// Last update of the driver row, shown as the shift date.
    pub updated_at: Option<DateTime<Utc>>,
}

/// `None` when there is no such driver.
pub async fn shift(
    pool: &PgPool,
    company_id: Uuid,
    driver_id: Uuid,
) -> Result<Option<CourierShift>, sqlx::Error> {
    sqlx::query_as(
        "SELECT v.id AS vehicle_id, dr.updated_at \
         FROM driver dr \
         LEFT JOIN vehicle v ON v.driver_id = dr.id \
         WHERE dr.id = $1 AND dr.company_id = $2",
    )
    .bind(driver_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

/// Routes of a vehicle whose status is not in `inactive`, highest number
/// first. Pool bounds are epoch milliseconds.
pub async fn vehicle_routes(
    pool: &PgPool,
    vehicle_id: Uuid,
    inactive: &[String],
) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        r#"SELECT jsonb_build_object(
            'id', rt.id,
            'number', rt.number,
            'status', rt.status,
            'pool', jsonb_build_object(
                'from', (extract(epoch FROM p."from") * 1000)::bigint,
                'to', (extract(epoch FROM p."to") * 1000)::bigint
            ),
            'order_deliveries', COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', od.id,
                    'status', od.status,
                    'order', jsonb_build_object(
                        'id', o.id,
                        'number', o.number,
                        'images', o.images,
                        'sender', jsonb_build_object('name', s.name, 'street', s.street, 'coordinate', s.coordinate),
                        'recipient', jsonb_build_object('name', r.name, 'street', r.street, 'coordinate', r.coordinate)
                    )
                ) ORDER BY od.position)
                FROM order_delivery od
                JOIN "order" o ON o.id = od.order_id
                LEFT JOIN sender s ON s.id = o.sender_id
                LEFT JOIN recipient r ON r.id = o.recipient_id
                WHERE od.route_id = rt.id
            ), '[]'::jsonb)
        )
        FROM route rt
        LEFT JOIN pool p ON p.id = rt.pool_id
        WHERE rt.vehicle_id = $1 AND NOT (rt.status::text = ANY($2))
        ORDER BY rt.number DESC"#,
    )
    .bind(vehicle_id)
    .bind(inactive)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}

/// A route with its legs, each leg carrying its order's documents and
/// sender/recipient streets.
pub async fn route_documents(
    pool: &PgPool,
    company_id: Uuid,
    route_id: Uuid,
) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(rt) || jsonb_build_object(
            'order_deliveries', COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'status', od.status,
                    'mile_type', od.mile_type,
                    'order', to_jsonb(o) || jsonb_build_object(
                        'document_act', (SELECT to_jsonb(da) FROM document_act da WHERE da.order_id = o.id LIMIT 1),
                        'document_ttn', (SELECT to_jsonb(dt) FROM document_ttn dt WHERE dt.order_id = o.id LIMIT 1),
                        'recipient', jsonb_build_object('street', r.street),
                        'sender', jsonb_build_object('street', s.street)
                    )
                ) ORDER BY od.position)
                FROM order_delivery od
                JOIN "order" o ON o.id = od.order_id
                LEFT JOIN sender s ON s.id = o.sender_id
                LEFT JOIN recipient r ON r.id = o.recipient_id
                WHERE od.route_id = rt.id
            ), '[]'::jsonb)
        )
        FROM route rt
        JOIN pool p ON p.id = rt.pool_id
        WHERE rt.id = $1 AND p.company_id = $2"#,
    )
    .bind(route_id)
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}
