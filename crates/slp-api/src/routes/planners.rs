//! # Route Planners
//!
//! A planner fires once a day at `startTime` and routes the company's
//! pools. The time is stored in UTC and exchanged with clients as `HH:MM`
//! in the zone named by the `TZ` header.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveTime;
use serde_json::Value;
use slp_core::ResponseEnvelope;
use slp_rpc_client::ops::{tms, Payload};
use sqlx::PgPool;
use uuid::Uuid;

use super::{forward, table_page, JsonBody};
use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_json, ApiPath, Ctx, PageParams, TimeZone};
use crate::state::AppState;

const PLANNER_EXCLUDES: &[&str] = &["company_id"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/:company_id/route-planners",
            get(list_planners).post(create_planner),
        )
        .route(
            "/companies/:company_id/route-planners/:planner_id",
            get(get_planner).patch(update_planner).delete(delete_planner),
        )
}

fn parse_clock(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppError::BadRequest(format!("startTime must be HH:MM, got {value:?}")))
}

async fn known_zone(pool: &PgPool, tz: &str) -> Result<(), AppError> {
    if db::time::zone_exists(pool, tz).await? {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Unknown time zone {tz:?}")))
    }
}

/// Take `startTime` out of the body and convert it to UTC.
async fn take_start_time(
    pool: &PgPool,
    body: &mut Payload,
    tz: &str,
) -> Result<Option<String>, AppError> {
    let Some(raw) = body.remove("startTime") else {
        return Ok(None);
    };
    let local = match raw {
        Value::String(s) => parse_clock(&s)?,
        Value::Null => return Ok(None),
        other => return Err(AppError::BadRequest(format!("startTime must be HH:MM, got {other}"))),
    };
    known_zone(pool, tz).await?;
    Ok(Some(db::time::clock_to_utc(pool, local, tz).await?))
}

async fn list_planners(
    State(state): State<AppState>,
    TimeZone(tz): TimeZone,
    ApiPath(company_id): ApiPath<Uuid>,
    paging: PageParams,
) -> Result<Json<ResponseEnvelope<Value>>, AppError> {
    let pool = state.db()?;
    known_zone(pool, &tz).await?;

    let descriptor = paging.paginate(db::planners::count(pool, company_id).await?);
    let rows = db::planners::list(
        pool,
        company_id,
        &tz,
        descriptor.limit_i64(),
        descriptor.offset_i64(),
    )
    .await?;
    let fields = state
        .catalog()?
        .describe_table("route_planner", PLANNER_EXCLUDES, "")
        .await?;
    Ok(Json(table_page(rows, &[], fields, &descriptor)))
}

async fn get_planner(
    State(state): State<AppState>,
    TimeZone(tz): TimeZone,
    ApiPath((company_id, planner_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let pool = state.db()?;
    known_zone(pool, &tz).await?;
    let planner = db::planners::get(pool, company_id, planner_id, &tz)
        .await?
        .ok_or_else(|| AppError::not_found("Route planner not found"))?;
    Ok(Json(planner))
}

async fn create_planner(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    TimeZone(tz): TimeZone,
    ApiPath(company_id): ApiPath<Uuid>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let mut body = extract_json(body)?;
    let start_time = take_start_time(state.db()?, &mut body, &tz)
        .await?
        .ok_or_else(|| AppError::bad_request("startTime is required"))?;
    let op = tms::RoutePlannerCreate {
        body,
        company_id: company_id.to_string(),
        start_time,
    };
    forward(&state, &ctx, &op).await
}

async fn update_planner(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    TimeZone(tz): TimeZone,
    ApiPath((_company_id, planner_id)): ApiPath<(Uuid, Uuid)>,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let mut body = extract_json(body)?;
    let start_time = take_start_time(state.db()?, &mut body, &tz).await?;
    let op = tms::RoutePlannerUpdate {
        body,
        id: planner_id.to_string(),
        start_time,
    };
    forward(&state, &ctx, &op).await
}

async fn delete_planner(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((_company_id, planner_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let op = tms::RoutePlannerDelete {
        id: planner_id.to_string(),
    };
    forward(&state, &ctx, &op).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_times_are_hours_and_minutes() {
        assert_eq!(
            parse_clock("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_clock("7:30pm").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
        assert!(parse_clock("24:00").is_err());
    }
}
