//! User reads.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{all_rows, camelized};

pub async fn list(pool: &PgPool) -> Result<Vec<Value>, sqlx::Error> {
    all_rows(pool, r#"SELECT to_jsonb(u) FROM "user" u ORDER BY u.created_at DESC"#).await
}

/// Company memberships of a user, each with its company.
pub async fn companies(pool: &PgPool, user_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
    let rows: Vec<Value> = sqlx::query_scalar(
        "SELECT to_jsonb(uc) || jsonb_build_object('company', to_jsonb(c)) \
         FROM user_company uc \
         JOIN company c ON c.id = uc.company_id \
         WHERE uc.user_id = $1 \
         ORDER BY c.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(camelized(rows))
}
