//! Identity provider client (Keycloak token introspection, RFC 7662).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::IdentityConfig;
use crate::error::RpcError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Introspection result. Only `active` is guaranteed by the protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIntrospection {
    pub active: bool,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
}

impl TokenIntrospection {
    pub fn realm_roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|r| r.roles.as_slice())
            .unwrap_or_default()
    }
}

/// Client for the identity provider.
///
/// Custom `Debug` redacts the client secret.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    introspect_url: String,
    client_id: String,
    client_secret: Zeroizing<String>,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("introspect_url", &self.introspect_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            introspect_url: format!(
                "{}/realms/{}/protocol/openid-connect/token/introspect",
                config.base_url.as_str().trim_end_matches('/'),
                config.realm
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Calls `POST {base}/realms/{realm}/protocol/openid-connect/token/introspect`.
    pub async fn introspect(&self, token: &str) -> Result<TokenIntrospection, RpcError> {
        let endpoint = "POST /token/introspect";
        let form = [
            ("token", token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let resp = self
            .http
            .post(&self.introspect_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RpcError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| RpcError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inactive_token_parses_without_claims() {
        let t: TokenIntrospection = serde_json::from_value(json!({"active": false})).unwrap();
        assert!(!t.active);
        assert!(t.realm_roles().is_empty());
    }

    #[test]
    fn realm_roles_are_exposed() {
        let t: TokenIntrospection = serde_json::from_value(json!({
            "active": true,
            "sub": "u-1",
            "preferred_username": "ops",
            "realm_access": {"roles": ["company-read", "dc-manager"]}
        }))
        .unwrap();
        assert_eq!(t.realm_roles(), ["company-read", "dc-manager"]);
        assert_eq!(t.sub.as_deref(), Some("u-1"));
    }
}
