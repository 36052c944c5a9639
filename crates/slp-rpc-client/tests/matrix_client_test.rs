//! Tests for `MatrixClient` against `POST /matrix-algorithm`.

use serde_json::json;
use slp_rpc_client::{GeoPoint, MatrixClient, MatrixConfig, MatrixRequest, RpcError};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> MatrixClient {
    MatrixClient::new(&MatrixConfig {
        base_url: mock_server.uri().parse().unwrap(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn compute_sends_depot_and_targets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/matrix-algorithm"))
        .and(body_json(json!({
            "first": {"lat": 41.3, "lon": 69.2},
            "last": {"lat": 41.3, "lon": 69.2},
            "targets": [{"lat": 41.31, "lon": 69.25}, {"lat": 41.35, "lon": 69.3}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{"duration": 300.0}, {"duration": 450.0}],
            "total_distance": 12500.0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let req = MatrixRequest::for_depot(
        Some(41.3),
        Some(69.2),
        vec![
            GeoPoint::new(Some(41.31), Some(69.25)),
            GeoPoint::new(Some(41.35), Some(69.3)),
        ],
    );

    let resp = client.compute(&req).await.unwrap();
    assert_eq!(resp.durations(), vec![300.0, 450.0]);
    assert_eq!(resp.total_distance, 12500.0);
}

#[tokio::test]
async fn compute_surfaces_non_2xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/matrix-algorithm"))
        .respond_with(ResponseTemplate::new(500).set_body_string("solver crashed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .compute(&MatrixRequest::for_depot(None, None, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::ApiError { status: 500, .. }));
}

#[tokio::test]
async fn compute_reports_unreachable_service() {
    let client = MatrixClient::new(&MatrixConfig {
        base_url: "http://127.0.0.1:1".parse().unwrap(),
        timeout_secs: 1,
    })
    .unwrap();
    let err = client
        .compute(&MatrixRequest::for_depot(None, None, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Http { .. }));
}
