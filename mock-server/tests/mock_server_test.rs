// Integration tests for the fixture-sequence mock server

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use spapi_mock_server::{create_mock_router, MockState};
use std::path::Path;
use tower::ServiceExt;

fn create_test_app(dir: &Path) -> Router {
    create_mock_router(MockState::new(dir))
}

fn write_fixture(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(format!("{}.json", name)), contents).unwrap();
}

async fn queue(app: &Router, names: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/responses")
                .header("content-type", "application/json")
                .body(Body::from(names.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn send(app: &Router, method: &str, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Queued fixtures are served in order, then 204.
#[tokio::test]
async fn test_fixtures_served_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a", r#"{"payload": {"AmazonOrderId": "902-1"}}"#);
    write_fixture(dir.path(), "b", r#"[1, 2, 3]"#);
    let app = create_test_app(dir.path());

    let (status, body) = queue(&app, json!(["a", "b"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"queued": 2}));

    let first = send(&app, "GET", "/orders/v0/orders/902-1").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["payload"]["AmazonOrderId"], "902-1");

    let second = send(&app, "POST", "/anything/else?x=1").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await, json!([1, 2, 3]));

    let third = send(&app, "GET", "/orders/v0/orders").await;
    assert_eq!(third.status(), StatusCode::NO_CONTENT);
}

/// Unregistered methods on the named routes are served from the queue too.
#[tokio::test]
async fn test_other_methods_on_named_routes_serve_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a", r#"{"n": 1}"#);
    write_fixture(dir.path(), "b", r#"{"n": 2}"#);
    write_fixture(dir.path(), "c", r#"{"n": 3}"#);
    let app = create_test_app(dir.path());

    queue(&app, json!(["a", "b", "c"])).await;

    let responses = send(&app, "GET", "/responses").await;
    assert_eq!(responses.status(), StatusCode::OK);
    assert_eq!(body_json(responses).await, json!({"n": 1}));

    let health = send(&app, "DELETE", "/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await, json!({"n": 2}));

    let token = send(&app, "GET", "/auth/o2/token").await;
    assert_eq!(token.status(), StatusCode::OK);
    assert_eq!(body_json(token).await, json!({"n": 3}));

    assert_eq!(send(&app, "GET", "/orders").await.status(), StatusCode::NO_CONTENT);
}

/// Posting a new list starts over from its first entry.
#[tokio::test]
async fn test_requeue_resets_index() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a", r#"{"n": 1}"#);
    write_fixture(dir.path(), "b", r#"{"n": 2}"#);
    let app = create_test_app(dir.path());

    queue(&app, json!(["a", "b"])).await;
    assert_eq!(body_json(send(&app, "GET", "/x").await).await["n"], 1);

    queue(&app, json!(["b"])).await;
    assert_eq!(body_json(send(&app, "GET", "/x").await).await["n"], 2);
    assert_eq!(send(&app, "GET", "/x").await.status(), StatusCode::NO_CONTENT);
}

/// A missing or malformed fixture is a 500 and still consumes its slot.
#[tokio::test]
async fn test_bad_fixtures_are_server_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "broken", "{not json");
    write_fixture(dir.path(), "ok", r#"{"ok": true}"#);
    let app = create_test_app(dir.path());

    queue(&app, json!(["missing", "broken", "ok"])).await;

    let missing = send(&app, "GET", "/x").await;
    assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(missing).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Mock response file not found:"));
    assert!(error.ends_with("missing.json"));

    let broken = send(&app, "GET", "/x").await;
    assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = body_json(broken).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid JSON in mock response file:"));

    let ok = send(&app, "GET", "/x").await;
    assert_eq!(body_json(ok).await, json!({"ok": true}));
}

/// Non-array bodies are rejected and leave the queue untouched.
#[tokio::test]
async fn test_queue_requires_array() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a", r#"{"n": 1}"#);
    let app = create_test_app(dir.path());

    queue(&app, json!(["a"])).await;

    let (status, body) = queue(&app, json!({"responses": ["a"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON array"));

    let (status, _) = queue(&app, json!(["../etc/passwd"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(body_json(send(&app, "GET", "/x").await).await["n"], 1);
}

/// Health and token endpoints never consume fixtures.
#[tokio::test]
async fn test_health_and_token_bypass_queue() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "a", r#"{"n": 1}"#);
    let app = create_test_app(dir.path());
    queue(&app, json!(["a"])).await;

    let health = send(&app, "GET", "/health").await;
    assert_eq!(body_json(health).await, json!({"status": "healthy"}));

    let token = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/o2/token")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(
                    "grant_type=refresh_token&refresh_token=Atzr%7Cabc&client_id=id&client_secret=s",
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(token.status(), StatusCode::OK);
    let token = body_json(token).await;
    assert_eq!(token["access_token"], "MockAccessToken");
    assert_eq!(token["expires_in"], 3600);
    assert_eq!(token["refresh_token"], "Atzr|abc");

    assert_eq!(body_json(send(&app, "GET", "/x").await).await["n"], 1);
}

/// Preflight requests are answered with permissive CORS headers.
#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/responses")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
