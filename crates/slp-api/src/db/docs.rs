//! Printed documents, opened from QR codes without a token.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Acceptance act with its order, rows and the users who signed the rows.
pub async fn act(pool: &PgPool, act_id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT jsonb_build_object(
            'order', (
                SELECT jsonb_build_object(
                    'external_number', o.external_number,
                    'name', o.name,
                    'price', o.price
                )
                FROM "order" o WHERE o.id = da.order_id
            ),
            'act_rows', COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', ar.id,
                    'date', ar.date,
                    'note', ar.note,
                    'created_at', ar.created_at,
                    'dc_name', ar.dc_name,
                    'user', CASE WHEN u.id IS NULL THEN NULL
                        ELSE jsonb_build_object('first_name', u.first_name, 'last_name', u.last_name) END
                ) ORDER BY ar.created_at)
                FROM act_row ar
                LEFT JOIN "user" u ON u.id = ar.user_id
                WHERE ar.document_act_id = da.id
            ), '[]'::jsonb),
            'comitent', da.comitent,
            'commissioner', da.commissioner,
            'commissioner_agent', da.commissioner_agent,
            'contract_number', da.contract_number,
            'contract_date', da.contract_date,
            'special_marks', da.special_marks
        )
        FROM document_act da
        WHERE da.id = $1"#,
    )
    .bind(act_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}

/// Consignment note with its order's weight and rows including the storage
/// and user of each row.
pub async fn ttn(pool: &PgPool, ttn_id: Uuid) -> Result<Option<Value>, sqlx::Error> {
    let row: Option<Value> = sqlx::query_scalar(
        r#"SELECT to_jsonb(dt) || jsonb_build_object(
            'order', (
                SELECT jsonb_build_object(
                    'external_number', o.external_number,
                    'name', o.name,
                    'dimension', jsonb_build_object('weight', d.weight)
                )
                FROM "order" o
                LEFT JOIN dimension d ON d.id = o.dimension_id
                WHERE o.id = dt.order_id
            ),
            'ttn_rows', COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'date', tr.date,
                    'created_at', tr.created_at,
                    'note', tr.note,
                    'storage', CASE WHEN st.id IS NULL THEN NULL
                        ELSE jsonb_build_object('code', st.code, 'name', st.name) END,
                    'user', CASE WHEN u.id IS NULL THEN NULL
                        ELSE jsonb_build_object('first_name', u.first_name, 'last_name', u.last_name) END
                ) ORDER BY tr.created_at)
                FROM ttn_row tr
                LEFT JOIN storage st ON st.id = tr.storage_id
                LEFT JOIN "user" u ON u.id = tr.user_id
                WHERE tr.document_ttn_id = dt.id
            ), '[]'::jsonb)
        )
        FROM document_ttn dt
        WHERE dt.id = $1"#,
    )
    .bind(ttn_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(super::camelize_row))
}
