use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use keygate::api::routes::create_router;
use keygate::config::{CorsConfig, KeygateConfig, PolicyConfig, StorageConfig};
use keygate::server::AppState;
use keygate::storage::providers::memory::MemoryStorage;
use keygate::storage::Storage;
use keygate::{KeyIssuer, KeyVerifier};

fn test_config(policy: PolicyConfig) -> KeygateConfig {
    KeygateConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        policy,
        storage: StorageConfig::Memory,
        cors: CorsConfig::default(),
    }
}

fn test_router(policy: PolicyConfig) -> Router {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let config = test_config(policy.clone());

    let state = Arc::new(AppState {
        issuer: KeyIssuer::new(&policy, Arc::clone(&storage)),
        verifier: KeyVerifier::new(&policy, Arc::clone(&storage)),
        storage,
        started_at: Instant::now(),
    });

    create_router(state, &config)
}

fn request_from(peer: &str, method: &str, uri: &str, body: &str) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn generate_then_verify_round_trip() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .clone()
        .oneshot(request_from("127.0.0.1:9999", "POST", "/key/generate", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["error"].is_null());
    let key = body["data"]["key"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["origin_address"], "127.0.0.1");

    let verify_body = serde_json::json!({ "key": key }).to_string();
    let response = router
        .oneshot(request_from(
            "127.0.0.1:9999",
            "POST",
            "/key/verify",
            &verify_body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["reason"], "NONE");
    assert_eq!(body["data"]["bound_address"], "127.0.0.1");
}

#[tokio::test]
async fn ttl_is_echoed_as_expiry() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .oneshot(request_from(
            "127.0.0.1:9999",
            "POST",
            "/key/generate",
            r#"{"ttl_seconds": 3600}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["data"]["expires_at"].is_string());
    assert!(body["data"]["issued_at"].is_string());
}

#[tokio::test]
async fn verification_from_another_address_is_rejected() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .clone()
        .oneshot(request_from("10.0.0.5:9999", "POST", "/key/generate", "{}"))
        .await
        .unwrap();
    let body = json_body(response).await;
    let key = body["data"]["key"].as_str().unwrap().to_string();

    let verify_body = serde_json::json!({ "key": key }).to_string();
    let response = router
        .oneshot(request_from(
            "10.0.0.9:9999",
            "POST",
            "/key/verify",
            &verify_body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["reason"], "ADDRESS_MISMATCH");
    assert_eq!(body["data"]["bound_address"], "10.0.0.5");
}

#[tokio::test]
async fn loopback_bypass_spans_ip_families() {
    let policy = PolicyConfig {
        localhost_bypass_enabled: true,
        ..PolicyConfig::default()
    };
    let router = test_router(policy);

    let response = router
        .clone()
        .oneshot(request_from("127.0.0.1:9999", "POST", "/key/generate", "{}"))
        .await
        .unwrap();
    let body = json_body(response).await;
    let key = body["data"]["key"].as_str().unwrap().to_string();

    let verify_body = serde_json::json!({ "key": key }).to_string();
    let response = router
        .oneshot(request_from(
            "[::1]:9999",
            "POST",
            "/key/verify",
            &verify_body,
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["reason"], "NONE");
}

#[tokio::test]
async fn malformed_key_yields_verdict_not_error() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .oneshot(request_from(
            "127.0.0.1:9999",
            "POST",
            "/key/verify",
            r#"{"key": "not-a-key"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["reason"], "MALFORMED");
}

#[tokio::test]
async fn health_reports_storage_status() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .oneshot(request_from("127.0.0.1:9999", "GET", "/health", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["storage"], true);
}

#[tokio::test]
async fn root_describes_the_service() {
    let router = test_router(PolicyConfig::default());

    let response = router
        .oneshot(request_from("127.0.0.1:9999", "GET", "/", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["service"], "keygate");
}
