//! # slp-rpc-client
//!
//! Typed clients for everything the SLP gateway talks to besides its own
//! database:
//!
//! - [`RpcClient`]: request/reply messages to the six backend services
//!   (`tms`, `wms`, `oms`, `ums`, `fms`, `geo`) over the broker's HTTP
//!   bridge. Each message is a typed [`RpcOperation`] in [`ops`].
//! - [`MatrixClient`]: the geo matrix service used by route aggregation.
//! - [`SearchClient`]: the Typesense documents API.
//! - [`IdentityClient`]: Keycloak token introspection.
//!
//! Backend replies arrive as [`slp_core::RpcEnvelope`]s. [`RpcClient::send`]
//! unwraps them: a `hasError: true` reply becomes
//! [`RpcError::Rejected`] carrying the mapped status.

pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod matrix;
pub mod operation;
pub mod ops;
pub mod search;
pub mod transport;

use std::sync::Arc;

pub use config::{ConfigError, IdentityConfig, MatrixConfig, QueueNames, RpcConfig, SearchConfig};
pub use context::RequestContext;
pub use error::RpcError;
pub use identity::{IdentityClient, TokenIntrospection};
pub use matrix::{GeoPoint, MatrixClient, MatrixRequest, MatrixResponse};
pub use operation::{RpcOperation, Service};
pub use search::{SearchClient, SearchQuery};
pub use transport::{HttpBridgeTransport, RpcTransport};

/// Client for the backend services.
#[derive(Debug, Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    queues: QueueNames,
}

impl RpcClient {
    /// Client over the broker's HTTP bridge.
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let transport = HttpBridgeTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config.queues.clone()))
    }

    /// Client over an arbitrary transport.
    pub fn with_transport(transport: Arc<dyn RpcTransport>, queues: QueueNames) -> Self {
        Self { transport, queues }
    }

    pub fn queues(&self) -> &QueueNames {
        &self.queues
    }

    /// Send one operation and unwrap the reply envelope.
    pub async fn send<O: RpcOperation>(
        &self,
        ctx: &RequestContext,
        op: &O,
    ) -> Result<O::Response, RpcError> {
        let endpoint = format!("{}.{}", O::SERVICE, O::PATTERN);
        let payload = serde_json::to_value(op).map_err(|e| RpcError::Payload {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let queue = O::SERVICE.queue(&self.queues);
        let envelope = self
            .transport
            .call(queue, O::PATTERN, payload, ctx)
            .await?;

        tracing::debug!(
            request_id = %ctx.request_id,
            endpoint = %endpoint,
            status = envelope.status,
            has_error = envelope.has_error,
            "rpc reply"
        );

        let data = envelope.into_result()?;
        serde_json::from_value(data).map_err(|e| RpcError::Payload {
            endpoint,
            source: e,
        })
    }
}
