//! Broker transport.
//!
//! [`RpcTransport`] is the seam between typed operations and the wire. The
//! shipped implementation, [`HttpBridgeTransport`], posts each message to the
//! broker's HTTP bridge, which performs the request/reply exchange on the
//! service queue and returns the service's envelope as the response body.
//!
//! ```text
//! POST {RPC_BRIDGE_URL}/rpc/{queue}/{pattern}
//! x-request-id: <request id>
//! traceparent:  <w3c traceparent, if any>
//!
//! <payload JSON>
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use slp_core::RpcEnvelope;

use crate::config::RpcConfig;
use crate::context::RequestContext;
use crate::error::RpcError;

/// Sends one request/reply message to a backend queue.
#[async_trait]
pub trait RpcTransport: Send + Sync + std::fmt::Debug {
    async fn call(
        &self,
        queue: &str,
        pattern: &str,
        payload: Value,
        ctx: &RequestContext,
    ) -> Result<RpcEnvelope<Value>, RpcError>;
}

/// Transport over the broker's HTTP bridge.
#[derive(Debug, Clone)]
pub struct HttpBridgeTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBridgeTransport {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.bridge_url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpBridgeTransport {
    async fn call(
        &self,
        queue: &str,
        pattern: &str,
        payload: Value,
        ctx: &RequestContext,
    ) -> Result<RpcEnvelope<Value>, RpcError> {
        let endpoint = format!("{queue}/{pattern}");
        let url = format!("{}/rpc/{queue}/{pattern}", self.base_url);

        let mut request = self
            .http
            .post(&url)
            .header("x-request-id", &ctx.request_id)
            .json(&payload);
        if let Some(traceparent) = &ctx.traceparent {
            request = request.header("traceparent", traceparent);
        }

        let resp = request.send().await.map_err(|e| RpcError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| RpcError::Deserialization {
            endpoint,
            source: e,
        })
    }
}
