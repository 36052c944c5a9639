//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! The gateway owns no entities of record. State holds only handles to the
//! things it talks to, each optional so the service starts with whatever is
//! configured and answers 503 on the endpoints that need a missing piece:
//!
//! - **Database pool**: every table read.
//! - **Schema introspector**: field descriptors, cached per table.
//! - **RPC client**: every write, forwarded to a backend service.
//! - **Matrix client**: route and pool aggregates.
//! - **Search client**: the courier list.
//! - **Identity client**: bearer token introspection.

use std::sync::Arc;

use slp_rpc_client::{IdentityClient, MatrixClient, RpcClient, SearchClient};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::catalog::{CatalogSource, Introspector, PgCatalog};
use crate::error::AppError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Option<PgPool>,
    pub catalog: Option<Introspector>,
    pub rpc: Option<RpcClient>,
    pub matrix: Option<MatrixClient>,
    pub search: Option<SearchClient>,
    pub identity: Option<IdentityClient>,
}

impl AppState {
    /// State with nothing configured. Every dependent endpoint answers 503
    /// and authentication is disabled.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            db: None,
            catalog: None,
            rpc: None,
            matrix: None,
            search: None,
            identity: None,
        }
    }

    /// Attach a pool and an introspector reading that pool's catalog.
    pub fn with_db(self, pool: PgPool) -> Self {
        let source: Arc<dyn CatalogSource> = Arc::new(PgCatalog::new(pool.clone()));
        Self {
            db: Some(pool),
            catalog: Some(Introspector::new(source)),
            ..self
        }
    }

    pub fn with_rpc(self, rpc: RpcClient) -> Self {
        Self {
            rpc: Some(rpc),
            ..self
        }
    }

    pub fn with_matrix(self, matrix: MatrixClient) -> Self {
        Self {
            matrix: Some(matrix),
            ..self
        }
    }

    pub fn with_search(self, search: SearchClient) -> Self {
        Self {
            search: Some(search),
            ..self
        }
    }

    pub fn with_identity(self, identity: IdentityClient) -> Self {
        Self {
            identity: Some(identity),
            ..self
        }
    }

    pub fn db(&self) -> Result<&PgPool, AppError> {
        self.db.as_ref().ok_or_else(|| {
            AppError::service_unavailable("database not configured. Set DATABASE_URL.")
        })
    }

    pub fn catalog(&self) -> Result<&Introspector, AppError> {
        self.catalog.as_ref().ok_or_else(|| {
            AppError::service_unavailable("database not configured. Set DATABASE_URL.")
        })
    }

    pub fn rpc(&self) -> Result<&RpcClient, AppError> {
        self.rpc.as_ref().ok_or_else(|| {
            AppError::service_unavailable("RPC bridge not configured. Set RPC_BRIDGE_URL.")
        })
    }

    pub fn matrix(&self) -> Result<&MatrixClient, AppError> {
        self.matrix
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("geo matrix client not configured."))
    }

    pub fn search(&self) -> Result<&SearchClient, AppError> {
        self.search.as_ref().ok_or_else(|| {
            AppError::service_unavailable("search not configured. Set TYPESENSE_API_KEY.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn unconfigured_collaborators_are_503() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.db().unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.catalog().unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.rpc().unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.matrix().unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.search().unwrap_err().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.identity.is_none());
    }
}
