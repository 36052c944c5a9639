//! Tests for `SearchClient` against the documents search API.

use serde_json::{json, Value};
use slp_rpc_client::{RpcError, SearchClient, SearchConfig, SearchQuery};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

fn test_client(mock_server: &MockServer) -> SearchClient {
    SearchClient::new(&SearchConfig {
        base_url: mock_server.uri().parse().unwrap(),
        api_key: Zeroizing::new("ts-key".into()),
        courier_collection: "courier_orders".into(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn search_sends_key_and_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/courier_orders/documents/search"))
        .and(header("X-TYPESENSE-API-KEY", "ts-key"))
        .and(query_param("q", "*"))
        .and(query_param("query_by", "number"))
        .and(query_param("filter_by", "companyId:=c1"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "found": 12,
            "hits": [{"document": {"id": "o6"}, "highlights": []}],
            "page": 2,
            "request_params": {"collection_name": "courier_orders", "per_page": 5, "q": "*"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let query = SearchQuery {
        query_by: "number".into(),
        page: 2,
        per_page: 5,
        ..SearchQuery::default()
    }
    .with_filter("companyId:=c1");

    let result = client
        .search::<Value>(client.courier_collection(), &query)
        .await
        .unwrap();
    assert_eq!(result.found, 12);
    assert_eq!(result.page, 2);
    assert_eq!(result.request_params.per_page, 5);
    assert_eq!(result.hits[0].document["id"], "o6");
}

#[tokio::test]
async fn search_surfaces_rejected_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/courier_orders/documents/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Forbidden"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client
        .search::<Value>("courier_orders", &SearchQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::ApiError { status: 401, .. }));
}
