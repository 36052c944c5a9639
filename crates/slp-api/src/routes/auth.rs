//! Token issue, refresh and password reset. These run before the caller
//! has a token, so the router is mounted outside the auth middleware.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use slp_rpc_client::ops::ums::{AuthLogin, AuthRefreshToken, AuthResetPassword};

use super::{forward, relay, JsonBody};
use crate::error::AppError;
use crate::extractors::{extract_json, Ctx};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/access-token", post(access_token))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/reset", post(reset))
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), AppError> {
        if self.username.trim().is_empty() {
            return Err(AppError::bad_request("username must not be empty"));
        }
        if self.password.is_empty() {
            return Err(AppError::bad_request("password must not be empty"));
        }
        Ok(())
    }
}

async fn access_token(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let credentials = extract_json(body)?;
    credentials.validate()?;
    let op = AuthLogin {
        username: credentials.username,
        password: credentials.password,
    };
    relay(&state, &ctx, &op).await
}

async fn refresh_token(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: JsonBody,
) -> Result<Json<Value>, AppError> {
    let body = extract_json(body)?;
    relay(&state, &ctx, &AuthRefreshToken { body }).await
}

async fn reset(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    body: JsonBody,
) -> Result<StatusCode, AppError> {
    let body = extract_json(body)?;
    forward(&state, &ctx, &AuthResetPassword { body }).await
}
