//! # Gateway Configuration
//!
//! HTTP-surface settings read from the environment at startup. Collaborator
//! settings (broker bridge, matrix, search, identity) live next to their
//! clients in `slp-rpc-client`; this module only covers what the server
//! itself needs.

use std::net::{IpAddr, SocketAddr};

use slp_rpc_client::ConfigError;

/// Release tag reported when `APP_RELEASE_TAG` is unset.
pub const DEFAULT_RELEASE_TAG: &str = "aaaa0000";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub hostname: IpAddr,
    pub port: u16,
    pub cors_origin: String,
    /// Echoed in the `app-release-tag` response header.
    pub release_tag: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hostname: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            cors_origin: "http://localhost:3000".into(),
            release_tag: DEFAULT_RELEASE_TAG.into(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Variables:
    /// - `APP_HOSTNAME` (default: `0.0.0.0`)
    /// - `APP_PORT` (default: 3000)
    /// - `APP_CORS_ORIGIN` (default: `http://localhost:3000`)
    /// - `APP_RELEASE_TAG` (default: `aaaa0000`)
    /// - `LOG_FORMAT` (`json` or anything else for human-readable output)
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        let hostname = match std::env::var("APP_HOSTNAME") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("APP_HOSTNAME"))?,
            Err(_) => d.hostname,
        };
        let port = match std::env::var("APP_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue("APP_PORT"))?,
            Err(_) => d.port,
        };
        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            hostname,
            port,
            cors_origin: std::env::var("APP_CORS_ORIGIN").unwrap_or(d.cors_origin),
            release_tag: std::env::var("APP_RELEASE_TAG").unwrap_or(d.release_tag),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.hostname, self.port)
    }
}
