//! Client configuration.
//!
//! Each collaborator is configured independently so the gateway can start
//! with only some of them reachable. A missing required variable is a
//! [`ConfigError`]; the binary logs it and serves 503 for the endpoints that
//! need that collaborator.

use url::Url;
use zeroize::Zeroizing;

/// Broker queue names, one per backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNames {
    pub tms: String,
    pub wms: String,
    pub oms: String,
    pub ums: String,
    pub fms: String,
    pub geo: String,
}

impl Default for QueueNames {
    fn default() -> Self {
        Self {
            tms: "tms".into(),
            wms: "wms".into(),
            oms: "oms".into(),
            ums: "user".into(),
            fms: "fms".into(),
            geo: "geo".into(),
        }
    }
}

impl QueueNames {
    /// Variables: `TMS_QUEUE`, `WMS_QUEUE`, `OMS_QUEUE`, `USER_QUEUE`,
    /// `FMS_QUEUE`, `GEO_QUEUE`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            tms: env_or("TMS_QUEUE", &d.tms),
            wms: env_or("WMS_QUEUE", &d.wms),
            oms: env_or("OMS_QUEUE", &d.oms),
            ums: env_or("USER_QUEUE", &d.ums),
            fms: env_or("FMS_QUEUE", &d.fms),
            geo: env_or("GEO_QUEUE", &d.geo),
        }
    }
}

/// Backend RPC over the broker's HTTP bridge.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub bridge_url: Url,
    pub queues: QueueNames,
    /// Transport timeout in seconds. This is the only timeout on RPC calls.
    pub timeout_secs: u64,
}

impl RpcConfig {
    /// Variables:
    /// - `RPC_BRIDGE_URL` (required)
    /// - `RPC_TIMEOUT_SECS` (default: 30)
    /// - queue names, see [`QueueNames::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("RPC_BRIDGE_URL")
            .map_err(|_| ConfigError::MissingVar("RPC_BRIDGE_URL"))?;
        Ok(Self {
            bridge_url: parse_url("RPC_BRIDGE_URL", &raw)?,
            queues: QueueNames::from_env(),
            timeout_secs: env_u64("RPC_TIMEOUT_SECS", 30),
        })
    }
}

/// Geo matrix service.
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl MatrixConfig {
    /// Variables:
    /// - `MATRIX_URL` (default: `http://10.0.1.35:8082`)
    /// - `MATRIX_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_url("MATRIX_URL", "http://10.0.1.35:8082")?,
            timeout_secs: env_u64("MATRIX_TIMEOUT_SECS", 30),
        })
    }
}

/// Typesense-compatible search engine.
///
/// Custom `Debug` redacts the API key.
#[derive(Clone)]
pub struct SearchConfig {
    pub base_url: Url,
    pub api_key: Zeroizing<String>,
    pub courier_collection: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("courier_collection", &self.courier_collection)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SearchConfig {
    /// Variables:
    /// - `TYPESENSE_API_KEY` (required)
    /// - `TYPESENSE_PROTOCOL` (default: `http`)
    /// - `TYPESENSE_HOST` (default: `localhost`)
    /// - `TYPESENSE_PORT` (default: 8108)
    /// - `TYPESENSE_CONNECTION_TIMEOUT_SECONDS` (default: 5)
    /// - `TYPESENSE_COURIER_COLLECTION` (default: `courier_orders`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("TYPESENSE_API_KEY")
            .map_err(|_| ConfigError::MissingVar("TYPESENSE_API_KEY"))?;
        let protocol = env_or("TYPESENSE_PROTOCOL", "http");
        let host = env_or("TYPESENSE_HOST", "localhost");
        let port = env_u64("TYPESENSE_PORT", 8108);

        Ok(Self {
            base_url: parse_url("TYPESENSE_HOST", &format!("{protocol}://{host}:{port}"))?,
            api_key: Zeroizing::new(api_key),
            courier_collection: env_or("TYPESENSE_COURIER_COLLECTION", "courier_orders"),
            timeout_secs: env_u64("TYPESENSE_CONNECTION_TIMEOUT_SECONDS", 5),
        })
    }
}

/// Keycloak token introspection.
///
/// Custom `Debug` redacts the client secret.
#[derive(Clone)]
pub struct IdentityConfig {
    pub base_url: Url,
    pub realm: String,
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl IdentityConfig {
    /// Variables:
    /// - `KEYCLOAK_URL` (required)
    /// - `KEYCLOAK_REALM` (required when `KEYCLOAK_URL` is set)
    /// - `KEYCLOAK_CLIENT_ID` (required when `KEYCLOAK_URL` is set)
    /// - `KEYCLOAK_SECRET` (default: empty)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw =
            std::env::var("KEYCLOAK_URL").map_err(|_| ConfigError::MissingVar("KEYCLOAK_URL"))?;
        let realm =
            std::env::var("KEYCLOAK_REALM").map_err(|_| ConfigError::MissingVar("KEYCLOAK_REALM"))?;
        let client_id = std::env::var("KEYCLOAK_CLIENT_ID")
            .map_err(|_| ConfigError::MissingVar("KEYCLOAK_CLIENT_ID"))?;

        Ok(Self {
            base_url: parse_url("KEYCLOAK_URL", &raw)?,
            realm,
            client_id,
            client_secret: Zeroizing::new(std::env::var("KEYCLOAK_SECRET").unwrap_or_default()),
            timeout_secs: env_u64("KEYCLOAK_TIMEOUT_SECS", 10),
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    parse_url(var, &raw)
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
}
