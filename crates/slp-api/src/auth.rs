//! # Authentication & Authorization Middleware
//!
//! Bearer tokens are issued by Keycloak and checked on every request through
//! token introspection. An active token yields a [`Caller`] carrying the
//! subject and realm roles, injected into the request extensions for
//! handlers to extract.
//!
//! When no identity provider is configured, authentication is disabled and
//! every request runs as a caller holding all realm roles.

use axum::extract::Request;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use slp_rpc_client::{IdentityClient, TokenIntrospection};

use crate::error::AppError;

// ── Role ────────────────────────────────────────────────────────────────────

/// Realm roles checked by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    CompanyCreate,
    CompanyRead,
    CompanyUpdate,
    CompanyManagement,
    OrderCreate,
    OrderManagement,
    GroupRead,
    GroupCreate,
    GroupUpdate,
    GroupDelete,
    GroupManagement,
    RoleRead,
    UserCreate,
    UserRead,
    UserUpdate,
    UserManagement,
    DcManager,
    PpManager,
}

impl Role {
    pub const ALL: [Role; 18] = [
        Self::CompanyCreate,
        Self::CompanyRead,
        Self::CompanyUpdate,
        Self::CompanyManagement,
        Self::OrderCreate,
        Self::OrderManagement,
        Self::GroupRead,
        Self::GroupCreate,
        Self::GroupUpdate,
        Self::GroupDelete,
        Self::GroupManagement,
        Self::RoleRead,
        Self::UserCreate,
        Self::UserRead,
        Self::UserUpdate,
        Self::UserManagement,
        Self::DcManager,
        Self::PpManager,
    ];

    /// Role name as it appears in `realm_access.roles`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyCreate => "company-create",
            Self::CompanyRead => "company-read",
            Self::CompanyUpdate => "company-update",
            Self::CompanyManagement => "company-management",
            Self::OrderCreate => "order-create",
            Self::OrderManagement => "order-management",
            Self::GroupRead => "group-read",
            Self::GroupCreate => "group-create",
            Self::GroupUpdate => "group-update",
            Self::GroupDelete => "group-delete",
            Self::GroupManagement => "group-management",
            Self::RoleRead => "role-read",
            Self::UserCreate => "user-create",
            Self::UserRead => "user-read",
            Self::UserUpdate => "user-update",
            Self::UserManagement => "user-management",
            Self::DcManager => "dc-manager",
            Self::PpManager => "pp-manager",
        }
    }
}

// ── Caller ──────────────────────────────────────────────────────────────────

/// The authenticated caller, available to handlers via `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Keycloak user id. `None` only when authentication is disabled.
    pub sub: Option<String>,
    pub username: Option<String>,
    pub roles: Vec<String>,
}

impl Caller {
    /// Caller used when authentication is disabled.
    pub fn unrestricted() -> Self {
        Self {
            sub: None,
            username: None,
            roles: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }

    fn from_introspection(token: TokenIntrospection) -> Self {
        let roles = token.realm_roles().to_vec();
        Self {
            sub: token.sub,
            username: token.preferred_username,
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    /// The caller's user id, required by operations that record who acted.
    pub fn subject(&self) -> Result<&str, AppError> {
        self.sub
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("token carries no subject".into()))
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Succeed when the caller holds at least one of `roles`.
pub fn require_any_role(caller: &Caller, roles: &[Role]) -> Result<(), AppError> {
    if roles.iter().any(|role| caller.has_role(*role)) {
        return Ok(());
    }
    let wanted: Vec<&str> = roles.iter().map(Role::as_str).collect();
    Err(AppError::Forbidden(format!(
        "one of roles [{}] required",
        wanted.join(", ")
    )))
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// `None` disables authentication.
    pub identity: Option<IdentityClient>,
}

// ── Middleware ──────────────────────────────────────────────────────────────

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("authorization header must use Bearer scheme".into())
        })
}

/// Introspect the bearer token and inject the [`Caller`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let identity = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.identity.clone());

    let Some(identity) = identity else {
        request.extensions_mut().insert(Caller::unrestricted());
        return next.run(request).await;
    };

    let token = match bearer_token(&request) {
        Ok(token) => token.to_string(),
        Err(err) => {
            tracing::warn!(reason = %err, "authentication failed");
            return err.into_response();
        }
    };

    match identity.introspect(&token).await {
        Ok(introspection) if introspection.active => {
            request
                .extensions_mut()
                .insert(Caller::from_introspection(introspection));
            next.run(request).await
        }
        Ok(_) => {
            tracing::warn!("authentication failed: inactive token");
            AppError::Unauthorized("invalid or expired token".into()).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}
