//! # slp-api: HTTP Gateway for the SLP Logistics Platform
//!
//! The gateway owns no entities. It reads PostgreSQL directly for tables
//! and lookups, and forwards every write to one of the backend services
//! (`oms`, `tms`, `wms`, `ums`, `fms`, `geo`) through `slp-rpc-client`.
//!
//! ## API Surface
//!
//! | Prefix (under `/api/v1`)          | Module                  | Auth |
//! |-----------------------------------|-------------------------|------|
//! | `/health/check`                   | [`routes::health`]      | no   |
//! | `/auth/*`                         | [`routes::auth`]        | no   |
//! | `/docs/*`                         | [`routes::docs`]        | no   |
//! | `/companies`, `/groups/*`         | [`routes::companies`]   | yes  |
//! | `/companies/:id/orders/*`         | [`routes::orders`]      | yes  |
//! | `/companies/:id/routes/*`         | [`routes::routes`]      | yes  |
//! | `/companies/:id/pools/*`          | [`routes::pools`]       | yes  |
//! | `/companies/:id/dcs/*`            | [`routes::dcs`]         | yes  |
//! | `/companies/:id/couriers/*`       | [`routes::couriers`]    | yes  |
//! | `/companies/:id/zones/*`          | [`routes::zones`]       | yes  |
//! | `/companies/:id/tariffs/*`        | [`routes::tariffs`]     | yes  |
//! | `/companies/:id/settings`         | [`routes::settings`]    | yes  |
//! | `/companies/:id/route-planners/*` | [`routes::planners`]    | yes  |
//! | `/companies/:id/drivers/*`        | [`routes::drivers`]     | yes  |
//! | `/companies/:id/vehicles/*`       | [`routes::vehicles`]    | yes  |
//! | `/users/*`                        | [`routes::users`]       | yes  |
//!
//! The health probe is also served at `/api/health/check`.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CORS → TraceLayer → RequestContext → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::auth::AuthConfig;
use crate::middleware::request_context::{request_context_middleware, ReleaseTag, REQUEST_ID};

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers([REQUEST_ID]);
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(AllowOrigin::exact(value)),
        Err(_) => {
            tracing::warn!(origin, "APP_CORS_ORIGIN is not a valid header value; CORS disabled");
            layer
        }
    }
}

/// Assemble the full application router with all routes and middleware.
///
/// Health, auth and docs are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        identity: state.identity.clone(),
    };
    let release_tag = ReleaseTag(state.config.release_tag.clone());
    let cors = cors_layer(&state.config.cors_origin);

    let api = Router::new()
        .merge(routes::companies::router())
        .merge(routes::orders::router())
        .merge(routes::routes::router())
        .merge(routes::pools::router())
        .merge(routes::dcs::router())
        .merge(routes::couriers::router())
        .merge(routes::zones::router())
        .merge(routes::tariffs::router())
        .merge(routes::settings::router())
        .merge(routes::planners::router())
        .merge(routes::drivers::router())
        .merge(routes::vehicles::router())
        .merge(routes::users::router())
        .layer(from_fn(auth::auth_middleware));

    let unauthenticated = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::docs::router());

    let v1 = Router::new().merge(unauthenticated).merge(api);

    Router::new()
        .nest("/api/v1", v1)
        .route("/api/health/check", get(routes::health::check))
        .layer(from_fn(request_context_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(cors)
        .layer(Extension(auth_config))
        .layer(Extension(release_tag))
        .with_state(state)
}
