// Integration tests for GET/POST/PUT /api/settings

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use spapi_toolkit::api::{create_settings_router, SettingsAppState};
use spapi_toolkit::settings::{are_settings_incomplete, Settings, SettingsStore};
use std::sync::Arc;
use tower::ServiceExt;

const BUNDLE: &str = r#"{"accountId":"123456789012","region":"us-east-1","clientId":"amzn1.application-oa2-client.abc","clientSecret":"secret","refreshToken":"Atzr|refresh","sellingPartnerId":"A1B2C3","sellingPartnerIdType":"merchantAccountId","marketplaceId":"ATVPDKIKX0DER"}"#;

fn create_test_app() -> (Router, Arc<SettingsStore>) {
    let key = BASE64.encode([0u8; 32]);
    let store = Arc::new(SettingsStore::new(":memory:", &key).unwrap());
    let state = SettingsAppState {
        store: store.clone(),
        secret_name: "settings".to_string(),
    };
    (create_settings_router(state), store)
}

fn request(method: &str, settings: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri("/api/settings");
    if let Some(settings) = settings {
        builder = builder.header("settings", settings);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// GET before anything is stored is a 404.
#[tokio::test]
async fn test_get_missing_settings() {
    let (app, _) = create_test_app();

    let response = app.oneshot(request("GET", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert_eq!(body["error"], "The Secret is not found in the settings store.");
}

/// POST stores the header value and GET returns it verbatim.
#[tokio::test]
async fn test_create_then_get() {
    let (app, _) = create_test_app();

    let response = app.clone().oneshot(request("POST", Some(BUNDLE))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({"data": {}}));

    let response = app.oneshot(request("GET", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let stored = body["settings"].as_str().unwrap();
    assert_eq!(stored, BUNDLE);

    let settings = Settings::from_secret_string(stored).unwrap();
    assert!(!are_settings_incomplete(&settings));
}

/// POST or PUT without the settings header is a 400.
#[tokio::test]
async fn test_missing_header_is_bad_request() {
    let (app, store) = create_test_app();

    for method in ["POST", "PUT"] {
        let response = app.clone().oneshot(request(method, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Invalid Inputs. Settings cannot be empty|null|undefined."
        );

        let response = app.clone().oneshot(request(method, Some(""))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert!(store.get("settings").unwrap().is_none());
}

/// Creating twice fails in the store and surfaces as a 500.
#[tokio::test]
async fn test_create_existing_is_server_error() {
    let (app, _) = create_test_app();

    let first = app.clone().oneshot(request("POST", Some("{}"))).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(request("POST", Some("{}"))).await.unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(second).await["error"], "Internal Server Error");
}

/// PUT replaces an existing bundle and fails when nothing was created.
#[tokio::test]
async fn test_put_updates_existing() {
    let (app, store) = create_test_app();

    let missing = app.clone().oneshot(request("PUT", Some(BUNDLE))).await.unwrap();
    assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);

    store.create("settings", "{}").unwrap();
    let before = store.get("settings").unwrap().unwrap().version_id;

    let response = app.clone().oneshot(request("PUT", Some(BUNDLE))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = store.get("settings").unwrap().unwrap();
    assert_eq!(after.secret_string, BUNDLE);
    assert_ne!(after.version_id, before);
}

/// Other methods are rejected by the router.
#[tokio::test]
async fn test_delete_not_allowed() {
    let (app, _) = create_test_app();

    let response = app.oneshot(request("DELETE", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
