//! Tests for `IdentityClient` token introspection.

use serde_json::json;
use slp_rpc_client::{IdentityClient, IdentityConfig, RpcError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zeroize::Zeroizing;

const INTROSPECT: &str = "/realms/slp/protocol/openid-connect/token/introspect";

fn test_client(mock_server: &MockServer) -> IdentityClient {
    IdentityClient::new(&IdentityConfig {
        base_url: mock_server.uri().parse().unwrap(),
        realm: "slp".into(),
        client_id: "gateway".into(),
        client_secret: Zeroizing::new("kc-secret".into()),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn introspect_posts_form_and_reads_roles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INTROSPECT))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("token=abc.def"))
        .and(body_string_contains("client_id=gateway"))
        .and(body_string_contains("client_secret=kc-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "user-1",
            "preferred_username": "dispatcher",
            "realm_access": {"roles": ["ORDER_READ", "DC_MANAGER"]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let token = client.introspect("abc.def").await.unwrap();
    assert!(token.active);
    assert_eq!(token.sub.as_deref(), Some("user-1"));
    assert_eq!(token.realm_roles(), ["ORDER_READ", "DC_MANAGER"]);
}

#[tokio::test]
async fn introspect_returns_inactive_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INTROSPECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": false})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let token = client.introspect("expired").await.unwrap();
    assert!(!token.active);
}

#[tokio::test]
async fn introspect_surfaces_client_auth_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INTROSPECT))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.introspect("abc").await.unwrap_err();
    assert!(matches!(err, RpcError::ApiError { status: 401, .. }));
}

#[test]
fn debug_redacts_client_secret() {
    let client = IdentityClient::new(&IdentityConfig {
        base_url: "http://keycloak:8080".parse().unwrap(),
        realm: "slp".into(),
        client_id: "gateway".into(),
        client_secret: Zeroizing::new("kc-secret".into()),
        timeout_secs: 5,
    })
    .unwrap();
    assert!(!format!("{client:?}").contains("kc-secret"));
}
