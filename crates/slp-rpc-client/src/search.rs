//! Search engine client (Typesense documents API).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slp_core::SearchResult;

use crate::config::{ConfigError, SearchConfig};
use crate::error::RpcError;

/// Largest page the search engine is asked for.
pub const MAX_PER_PAGE: u64 = 100;

/// Query parameters for `documents/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub query_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_by: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            q: "*".into(),
            query_by: String::new(),
            filter_by: None,
            sort_by: None,
            facet_by: None,
            page: 1,
            per_page: 10,
        }
    }
}

impl SearchQuery {
    /// AND an extra clause onto `filter_by`. The existing filter is
    /// parenthesized so an `||` inside it cannot escape the clause.
    pub fn with_filter(mut self, clause: &str) -> Self {
        self.filter_by = Some(match self.filter_by.take() {
            Some(existing) if !existing.trim().is_empty() => format!("{clause} && ({existing})"),
            _ => clause.to_string(),
        });
        self
    }

    /// Clamp `page` to at least 1 and `per_page` into `[1, MAX_PER_PAGE]`.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        if self.q.trim().is_empty() {
            self.q = "*".into();
        }
        self
    }
}

/// Client for the search engine.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    courier_collection: String,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, RpcError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "X-TYPESENSE-API-KEY",
            reqwest::header::HeaderValue::from_str(config.api_key.as_str()).map_err(|_| {
                RpcError::Config(ConfigError::InvalidValue("TYPESENSE_API_KEY"))
            })?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            courier_collection: config.courier_collection.clone(),
        })
    }

    /// Collection holding courier order documents.
    pub fn courier_collection(&self) -> &str {
        &self.courier_collection
    }

    /// Calls `GET {base_url}/collections/{collection}/documents/search`.
    pub async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &SearchQuery,
    ) -> Result<SearchResult<T>, RpcError> {
        let endpoint = format!("GET /collections/{collection}/documents/search");
        let url = format!("{}/collections/{collection}/documents/search", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| RpcError::Http {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_clamps() {
        let q = SearchQuery {
            q: " ".into(),
            page: 0,
            per_page: 1000,
            ..SearchQuery::default()
        }
        .normalized();
        assert_eq!(q.q, "*");
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn filters_are_anded() {
        let q = SearchQuery::default().with_filter("companyId:=c1");
        assert_eq!(q.filter_by.as_deref(), Some("companyId:=c1"));

        let q = SearchQuery {
            filter_by: Some("status:=NEW".into()),
            ..SearchQuery::default()
        }
        .with_filter("companyId:=c1");
        assert_eq!(q.filter_by.as_deref(), Some("companyId:=c1 && (status:=NEW)"));
    }
}
