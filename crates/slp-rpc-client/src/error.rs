//! Client error types.

use slp_core::RpcFailure;

/// Errors from calls to the gateway's collaborators.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The collaborator returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body could not be read as JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Payload could not be converted to or from the operation's types.
    #[error("failed to convert payload for {endpoint}: {source}")]
    Payload {
        endpoint: String,
        source: serde_json::Error,
    },
    /// A backend service answered with `hasError: true`.
    #[error(transparent)]
    Rejected(#[from] RpcFailure),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl RpcError {
    /// `true` when the collaborator could not be reached or answered
    /// outside its contract.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::ApiError { .. } | Self::Deserialization { .. }
        )
    }
}
