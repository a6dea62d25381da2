#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use carte_api::app::build_app;
use carte_api::auth::jwt::{generate_access_token, JwtConfig};
use carte_api::config::ServerConfig;
use carte_api::state::AppState;
use carte_core::staging::StagingStore;
use carte_core::store::MemoryCatalogStore;

/// A fully wired test application backed by the in-memory store.
///
/// Holds direct handles to the store and staging area so tests can seed
/// and inspect state without going through HTTP, plus the temp dir that
/// owns the asset root and placeholder fixture for the test's lifetime.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryCatalogStore>,
    pub staging: StagingStore,
    pub config: Arc<ServerConfig>,
    pub dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults and fixture paths
/// under the given temp dir.
pub fn test_config(dir: &TempDir) -> ServerConfig {
    let placeholder_image = dir.path().join("default.jpg");
    std::fs::write(&placeholder_image, b"placeholder-image-bytes").unwrap();

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        asset_root: dir.path().join("assets"),
        placeholder_image,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application with the same middleware stack production
/// uses (CORS, request ID, timeout, tracing, panic recovery), backed by
/// the in-memory store.
pub fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(test_config(&dir));

    let store = Arc::new(MemoryCatalogStore::new());
    let staging = StagingStore::new();

    let state = AppState {
        store: Arc::clone(&store) as Arc<dyn carte_core::store::CatalogStore>,
        staging: staging.clone(),
        config: Arc::clone(&config),
    };

    TestApp {
        app: build_app(state),
        store,
        staging,
        config,
        dir,
    }
}

/// Path where committed assets land for this test app.
pub fn asset_root(app: &TestApp) -> PathBuf {
    app.config.asset_root.clone()
}

/// Mint an access token for the given caller email.
pub fn token_for(app: &TestApp, email: &str) -> String {
    generate_access_token(email, &app.config.jwt).unwrap()
}

// ── Request helpers ──────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

const MULTIPART_BOUNDARY: &str = "carte-test-boundary";

/// Build a single-field `multipart/form-data` POST request.
pub fn multipart_request(uri: &str, token: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{field}.bin\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: &str,
    field: &str,
    data: &[u8],
) -> Response<Body> {
    app.oneshot(multipart_request(uri, token, field, data))
        .await
        .unwrap()
}

// ── Response helpers ─────────────────────────────────────────────────

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a status code and return the parsed error body.
pub async fn expect_error(
    response: Response<Body>,
    status: StatusCode,
) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert!(json["error"].is_string(), "error body must carry a message");
    assert!(json["code"].is_string(), "error body must carry a code");
    json
}
