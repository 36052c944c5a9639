//! # Request Context
//!
//! Assigns every inbound request a correlation id and opens a span carrying
//! it, so every log line emitted while serving the request (including the
//! error log written by [`crate::error::AppError`]) can be tied back to it.
//!
//! - `x-request-id` is taken from the request or generated (UUID v4) and
//!   echoed on the response.
//! - `traceparent` is kept verbatim for forwarding to backend services.
//! - `app-release-tag` is set on every response.
//!
//! The resulting [`RequestContext`] is stored in the request extensions and
//! handed to outbound calls explicitly through [`crate::extractors::Ctx`].

use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use slp_rpc_client::RequestContext;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::DEFAULT_RELEASE_TAG;

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACEPARENT: HeaderName = HeaderName::from_static("traceparent");
pub const RELEASE_TAG: HeaderName = HeaderName::from_static("app-release-tag");

/// Release tag echoed on responses, injected as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag(pub String);

impl Default for ReleaseTag {
    fn default() -> Self {
        Self(DEFAULT_RELEASE_TAG.into())
    }
}

fn header_string(request: &Request, name: &HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        header_string(&request, &REQUEST_ID).unwrap_or_else(|| Uuid::new_v4().to_string());
    let traceparent = header_string(&request, &TRACEPARENT);
    let release_tag = request
        .extensions()
        .get::<ReleaseTag>()
        .cloned()
        .unwrap_or_default();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id.clone()).with_traceparent(traceparent));

    async move {
        let started = Instant::now();
        tracing::info!("request received");

        let mut response = next.run(request).await;

        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "response sent"
        );

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(REQUEST_ID, value);
        }
        if let Ok(value) = HeaderValue::from_str(&release_tag.0) {
            headers.insert(RELEASE_TAG, value);
        }
        response
    }
    .instrument(span)
    .await
}
