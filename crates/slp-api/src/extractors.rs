//! # Custom Extractors
//!
//! Wrappers around axum's extractors that reject with [`AppError`] (so
//! every 400 has the standard JSON body), plus the header- and query-derived
//! values handlers share: paging, time zone, language and the outbound
//! request context.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::http::Uri;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use slp_core::pagination::parse_lenient;
use slp_core::{paginate, PaginationDescriptor};
use slp_rpc_client::RequestContext;

use crate::auth::Caller;
use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// `Path` that rejects with a JSON 400.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(v)| Self(v))
            .map_err(|err| AppError::BadRequest(err.body_text()))
    }
}

/// `Query` that rejects with a JSON 400.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(v)| Self(v))
            .map_err(|err| AppError::BadRequest(err.body_text()))
    }
}

// ── Paging ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawPage {
    page: Option<String>,
    #[serde(rename = "perPage")]
    per_page: Option<String>,
}

/// `page` and `perPage` from the query string, parsed leniently: garbage
/// behaves like an absent value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    pub fn paginate(&self, count: u64) -> PaginationDescriptor {
        paginate(count, self.page, self.per_page)
    }

    fn from_uri(uri: &Uri) -> Self {
        let raw = Query::<RawPage>::try_from_uri(uri)
            .map(|Query(v)| v)
            .unwrap_or_default();
        Self {
            page: parse_lenient(raw.page.as_deref()),
            per_page: parse_lenient(raw.per_page.as_deref()),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PageParams {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

// ── Headers ─────────────────────────────────────────────────────────────────

/// IANA zone from the `TZ` header, `UTC` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZone(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for TimeZone {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tz = parts
            .headers
            .get("tz")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("UTC");
        Ok(Self(tz.to_string()))
    }
}

/// First tag of `Accept-Language`, `ru` when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptLanguage(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AcceptLanguage {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(axum::http::header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split([',', ';']).next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("ru");
        Ok(Self(lang.to_string()))
    }
}

// ── Request context ─────────────────────────────────────────────────────────

/// Correlation context for outbound calls, tagged with the caller's subject.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default();
        let user = parts.extensions.get::<Caller>().and_then(|c| c.sub.clone());
        Ok(Self(ctx.with_user(user)))
    }
}

// ── Date filters ────────────────────────────────────────────────────────────

/// Parse a `from`/`to` filter value: RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC)
/// or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(name: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(naive.and_utc()));
    }
    Err(AppError::BadRequest(format!("{name} must be a date, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(uri: &str) -> PageParams {
        PageParams::from_uri(&uri.parse().unwrap())
    }

    #[test]
    fn page_params_are_lenient() {
        let p = params("/pools?page=abc&perPage=25&status=ACTIVE");
        assert_eq!(p.page, None);
        assert_eq!(p.per_page, Some(25));

        let d = p.paginate(60);
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 25);
        assert_eq!(d.total_pages, 3);
    }

    #[test]
    fn page_params_without_query() {
        let d = params("/pools").paginate(5);
        assert_eq!((d.page, d.per_page, d.offset), (1, 10, 0));
    }

    #[test]
    fn page_size_is_capped() {
        let d = params("/pools?page=2&perPage=500").paginate(1000);
        assert_eq!(d.per_page, 100);
        assert_eq!(d.offset, 100);
    }

    #[test]
    fn dates_accept_common_shapes() {
        let a = parse_datetime("from", Some("2024-03-01T10:00:00+05:00")).unwrap().unwrap();
        assert_eq!(a.to_rfc3339(), "2024-03-01T05:00:00+00:00");
        let b = parse_datetime("from", Some("2024-03-01")).unwrap().unwrap();
        assert_eq!(b.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let c = parse_datetime("to", Some("2024-03-01T23:59:59.500")).unwrap().unwrap();
        assert_eq!(c.timestamp(), b.timestamp() + 86_399);
        assert!(parse_datetime("from", None).unwrap().is_none());
        assert!(parse_datetime("from", Some("  ")).unwrap().is_none());
    }

    #[test]
    fn bad_dates_are_400() {
        let err = parse_datetime("from", Some("yesterday")).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
