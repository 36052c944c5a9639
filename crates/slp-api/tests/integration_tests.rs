//! # Integration Tests for slp-api
//!
//! Drives the assembled router with `oneshot`: health probes, 503 for
//! unconfigured collaborators, write forwarding over an in-memory
//! transport, backend rejections, authentication and role checks, and the
//! request-context headers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use slp_api::config::AppConfig;
use slp_api::AppState;
use slp_core::RpcEnvelope;
use slp_rpc_client::{
    IdentityClient, IdentityConfig, QueueNames, RequestContext, RpcClient, RpcError, RpcTransport,
};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPANY: &str = "6a1f6bb4-2f55-4c43-9a3e-2b1d7c9b5e10";

/// One message as it reached the transport.
#[derive(Debug, Clone)]
struct Sent {
    queue: String,
    pattern: String,
    payload: Value,
    request_id: String,
}

/// Records every call and answers with a fixed envelope.
#[derive(Debug)]
struct RecordingTransport {
    reply: RpcEnvelope<Value>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    fn replying(reply: RpcEnvelope<Value>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl RpcTransport for RecordingTransport {
    async fn call(
        &self,
        queue: &str,
        pattern: &str,
        payload: Value,
        ctx: &RequestContext,
    ) -> Result<RpcEnvelope<Value>, RpcError> {
        self.sent.lock().push(Sent {
            queue: queue.to_string(),
            pattern: pattern.to_string(),
            payload,
            request_id: ctx.request_id.clone(),
        });
        Ok(self.reply.clone())
    }
}

/// Helper: app with nothing configured and authentication disabled.
fn test_app() -> axum::Router {
    slp_api::app(AppState::new(AppConfig::default()))
}

/// Helper: app forwarding writes to `transport`.
fn test_app_with_rpc(transport: Arc<RecordingTransport>) -> axum::Router {
    let rpc = RpcClient::with_transport(transport, QueueNames::default());
    slp_api::app(AppState::new(AppConfig::default()).with_rpc(rpc))
}

/// Helper: app authenticating against a mock identity provider.
fn test_app_with_identity(server: &MockServer) -> axum::Router {
    let identity = IdentityClient::new(&IdentityConfig {
        base_url: server.uri().parse().unwrap(),
        realm: "slp".into(),
        client_id: "gateway".into(),
        client_secret: String::from("secret").into(),
        timeout_secs: 5,
    })
    .unwrap();
    slp_api::app(AppState::new(AppConfig::default()).with_identity(identity))
}

async fn mock_introspection(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/realms/slp/protocol/openid-connect/token/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// -- Health ---------------------------------------------------------------------

#[tokio::test]
async fn health_check_is_served_on_both_prefixes() {
    for uri in ["/api/health/check", "/api/v1/health/check"] {
        let response = test_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(response).await, json!({"status": "OK"}));
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let response = test_app().oneshot(get("/api/v1/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Unconfigured collaborators ---------------------------------------------------

#[tokio::test]
async fn reads_without_database_return_503() {
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs");
    let response = test_app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn writes_without_rpc_return_503() {
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs");
    let response = test_app()
        .oneshot(send_json("POST", &uri, json!({"name": "Base"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn courier_search_without_search_client_returns_503() {
    let uri = format!("/api/v1/companies/{COMPANY}/couriers");
    let response = test_app().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Write forwarding -------------------------------------------------------------

#[tokio::test]
async fn tariff_create_is_forwarded_to_tms() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(json!({"id": "t-1"})));
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs");
    let response = test_app_with_rpc(transport.clone())
        .oneshot(send_json("POST", &uri, json!({"name": "Base", "price": 1200})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].queue, "tms");
    assert_eq!(sent[0].pattern, "tariff.create");
    assert_eq!(
        sent[0].payload,
        json!({"name": "Base", "price": 1200, "companyId": COMPANY})
    );
}

#[tokio::test]
async fn request_id_reaches_the_transport() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(Value::Null));
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs/{COMPANY}");
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = test_app_with_rpc(transport.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = transport.sent();
    assert_eq!(sent[0].pattern, "tariff.delete");
    assert_eq!(sent[0].request_id, "req-42");
    assert_eq!(sent[0].payload, json!({"id": COMPANY}));
}

#[tokio::test]
async fn fleet_catalog_routes_win_over_vehicle_ids() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(Value::Null));
    let app = test_app_with_rpc(transport.clone());

    let create = format!("/api/v1/companies/{COMPANY}/vehicles/body-type");
    let response = app
        .clone()
        .oneshot(send_json("POST", &create, json!({"name": "Van"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let update = format!("/api/v1/companies/{COMPANY}/vehicles/colour/7");
    let response = app
        .clone()
        .oneshot(send_json("PATCH", &update, json!({"name": "White"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let vehicle = format!("/api/v1/companies/{COMPANY}/vehicles/{COMPANY}");
    let response = app
        .oneshot(send_json("PATCH", &vehicle, json!({"plateNumber": "01A123BC"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = transport.sent();
    let patterns: Vec<&str> = sent.iter().map(|s| s.pattern.as_str()).collect();
    assert_eq!(patterns, ["body-type.create", "colour.update", "vehicle.update"]);
    assert!(sent.iter().all(|s| s.queue == "fms"));
    assert_eq!(sent[1].payload, json!({"name": "White", "id": 7}));
}

#[tokio::test]
async fn group_membership_goes_to_the_user_queue() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(Value::Null));
    let uri = format!("/api/v1/users/{COMPANY}/groups");
    let group = "0c7d4b1e-8a36-4f5b-9a1d-3e2f1a0b9c8d";
    let response = test_app_with_rpc(transport.clone())
        .oneshot(send_json("POST", &uri, json!({"groupId": group})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let sent = transport.sent();
    assert_eq!(sent[0].queue, "user");
    assert_eq!(sent[0].pattern, "user.add-to-group");
    assert_eq!(sent[0].payload, json!({"id": COMPANY, "groupId": group}));
}

#[tokio::test]
async fn pass_through_reads_return_service_data() {
    let transport =
        RecordingTransport::replying(RpcEnvelope::ok(json!([{"id": "g1", "name": "Dispatch"}])));
    let uri = format!("/api/v1/users/{COMPANY}/groups");
    let response = test_app_with_rpc(transport).oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([{"id": "g1", "name": "Dispatch"}]));
}

// -- Backend rejections -----------------------------------------------------------

#[tokio::test]
async fn backend_not_found_is_404_with_its_message() {
    let transport = RecordingTransport::replying(RpcEnvelope::error(404, "Tariff not found"));
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs/{COMPANY}");
    let response = test_app_with_rpc(transport)
        .oneshot(send_json("PATCH", &uri, json!({"price": 10})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Tariff not found");
}

#[tokio::test]
async fn backend_server_error_is_reported_as_bad_request() {
    let transport = RecordingTransport::replying(RpcEnvelope::error(500, "constraint violated"));
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs");
    let response = test_app_with_rpc(transport)
        .oneshot(send_json("POST", &uri, json!({"name": "Base"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Request validation -----------------------------------------------------------

#[tokio::test]
async fn malformed_json_is_400() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(Value::Null));
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/companies/{COMPANY}/tariffs"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = test_app_with_rpc(transport.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn malformed_path_id_is_400() {
    let response = test_app()
        .oneshot(get("/api/v1/companies/not-a-uuid/tariffs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_delivery_ids_are_rejected() {
    let transport = RecordingTransport::replying(RpcEnvelope::ok(Value::Null));
    let uri = format!("/api/v1/companies/{COMPANY}/couriers/{COMPANY}/routes-orders/courier-on-point");
    let response = test_app_with_rpc(transport.clone())
        .oneshot(send_json("PATCH", &uri, json!({"ids": []})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.sent().is_empty());
}

// -- Authentication ---------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_401_when_identity_is_configured() {
    let server = MockServer::start().await;
    let uri = format!("/api/v1/companies/{COMPANY}/tariffs");
    let response = test_app_with_identity(&server)
        .oneshot(get(&uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_token_is_401() {
    let server = MockServer::start().await;
    mock_introspection(&server, json!({"active": false})).await;
    let request = Request::builder()
        .uri(format!("/api/v1/companies/{COMPANY}/tariffs"))
        .header("authorization", "Bearer stale")
        .body(Body::empty())
        .unwrap();
    let response = test_app_with_identity(&server)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_skip_authentication() {
    let server = MockServer::start().await;
    let app = test_app_with_identity(&server);

    let response = app
        .clone()
        .oneshot(get("/api/v1/health/check"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Reaches the handler, which then needs a database.
    let response = app
        .oneshot(get(&format!("/api/v1/docs/act/{COMPANY}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn missing_role_is_403() {
    let server = MockServer::start().await;
    mock_introspection(
        &server,
        json!({
            "active": true,
            "sub": "u-1",
            "preferred_username": "dispatcher",
            "realm_access": {"roles": ["company-read"]}
        }),
    )
    .await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header("authorization", "Bearer good")
        .header("content-type", "application/json")
        .body(Body::from(json!({"username": "new"}).to_string()))
        .unwrap();
    let response = test_app_with_identity(&server)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn granted_role_reaches_the_handler() {
    let server = MockServer::start().await;
    mock_introspection(
        &server,
        json!({
            "active": true,
            "sub": "u-1",
            "realm_access": {"roles": ["user-management"]}
        }),
    )
    .await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users")
        .header("authorization", "Bearer good")
        .header("content-type", "application/json")
        .body(Body::from(json!({"username": "new"}).to_string()))
        .unwrap();
    let response = test_app_with_identity(&server)
        .oneshot(request)
        .await
        .unwrap();
    // Past the role check; no RPC client is configured.
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Request context --------------------------------------------------------------

#[tokio::test]
async fn request_id_and_release_tag_are_echoed() {
    let request = Request::builder()
        .uri("/api/v1/health/check")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(response.headers()["app-release-tag"], "aaaa0000");
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let response = test_app().oneshot(get("/api/health/check")).await.unwrap();
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
