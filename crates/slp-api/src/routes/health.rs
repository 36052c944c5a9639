//! Liveness probe, reachable without a token.

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health/check", get(check))
}

pub async fn check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "OK" })
}
