//! Geo matrix client.
//!
//! One endpoint, `POST {MATRIX_URL}/matrix-algorithm`, which takes the depot
//! as `first`/`last` and the stops as `targets` and returns per-stop
//! durations plus the total tour distance. Results are never cached.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::MatrixConfig;
use crate::error::RpcError;

/// A coordinate as the matrix service expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl GeoPoint {
    pub fn new(lat: Option<f64>, lon: Option<f64>) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<GeoPoint>,
    pub targets: Vec<GeoPoint>,
}

impl MatrixRequest {
    /// Tour that starts and ends at the depot.
    ///
    /// The depot is only sent when both of its coordinates are known.
    pub fn for_depot(latitude: Option<f64>, longitude: Option<f64>, targets: Vec<GeoPoint>) -> Self {
        let depot = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(Some(lat), Some(lon))),
            _ => None,
        };
        Self {
            first: depot,
            last: depot,
            targets,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatrixRoute {
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatrixResponse {
    #[serde(default)]
    pub routes: Vec<MatrixRoute>,
    #[serde(default)]
    pub total_distance: f64,
}

impl MatrixResponse {
    pub fn durations(&self) -> Vec<f64> {
        self.routes.iter().map(|r| r.duration).collect()
    }
}

/// Client for the geo matrix service.
#[derive(Debug, Clone)]
pub struct MatrixClient {
    http: reqwest::Client,
    base_url: String,
}

impl MatrixClient {
    pub fn new(config: &MatrixConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Calls `POST {base_url}/matrix-algorithm`.
    pub async fn compute(&self, req: &MatrixRequest) -> Result<MatrixResponse, RpcError> {
        let endpoint = "POST /matrix-algorithm";
        let url = format!("{}/matrix-algorithm", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(req)
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
    fn depot_included_only_with_both_coordinates() {
        let targets = vec![GeoPoint::new(Some(1.0), Some(2.0))];
        let full = MatrixRequest::for_depot(Some(41.0), Some(69.0), targets.clone());
        assert_eq!(
            serde_json::to_value(&full).unwrap(),
            json!({
                "first": {"lat": 41.0, "lon": 69.0},
                "last": {"lat": 41.0, "lon": 69.0},
                "targets": [{"lat": 1.0, "lon": 2.0}]
            })
        );

        let partial = MatrixRequest::for_depot(Some(41.0), None, targets);
        let v = serde_json::to_value(&partial).unwrap();
        assert!(v.get("first").is_none());
        assert!(v.get("last").is_none());
    }

    #[test]
    fn response_tolerates_extra_fields() {
        let resp: MatrixResponse = serde_json::from_value(json!({
            "routes": [{"duration": 12.5, "distance": 100}, {"duration": 3}],
            "total_distance": 4200.0,
            "geometry": "..."
        }))
        .unwrap();
        assert_eq!(resp.durations(), vec![12.5, 3.0]);
        assert_eq!(resp.total_distance, 4200.0);
    }
}
