//! Fixture-sequence HTTP test double for SP-API clients.
//!
//! `POST /responses` queues fixture names. Every other request is answered
//! with the next fixture's JSON from the fixtures directory, then 204 once the
//! queue runs dry.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

pub const MOCK_ACCESS_TOKEN: &str = "MockAccessToken";

/// Ordered fixture names and the position of the next one to serve.
#[derive(Debug, Default)]
pub struct FixtureQueue {
    names: Vec<String>,
    index: usize,
}

impl FixtureQueue {
    /// Replace the queue and start again from the first name.
    pub fn replace(&mut self, names: Vec<String>) {
        self.names = names;
        self.index = 0;
    }

    /// Take the next name, advancing past it.
    pub fn advance(&mut self) -> Option<String> {
        let name = self.names.get(self.index).cloned()?;
        self.index += 1;
        Some(name)
    }

    pub fn remaining(&self) -> usize {
        self.names.len().saturating_sub(self.index)
    }
}

/// Shared state for the mock server
pub struct MockState {
    pub fixtures_dir: PathBuf,
    pub queue: Mutex<FixtureQueue>,
}

impl MockState {
    pub fn new(fixtures_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
            queue: Mutex::new(FixtureQueue::default()),
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

enum AppError {
    BadRequest(String),
    ServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

/// Create the mock router. CORS is open to any origin, method and header.
///
/// Unregistered methods on the named routes fall through to the fixture queue
/// like any other request.
pub fn create_mock_router(state: MockState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/responses",
            post(queue_responses).fallback(serve_next_fixture),
        )
        .route("/health", get(health).fallback(serve_next_fixture))
        .route(
            "/auth/o2/token",
            post(issue_token).fallback(serve_next_fixture),
        )
        .fallback(serve_next_fixture)
        .layer(cors)
        .with_state(Arc::new(state))
}

/// POST /responses - Replace the fixture queue with a JSON array of names
async fn queue_responses(
    State(state): State<Arc<MockState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let names = parse_fixture_names(&body).map_err(AppError::BadRequest)?;
    let queued = names.len();

    state
        .queue
        .lock()
        .map_err(|_| AppError::ServerError("Fixture queue lock poisoned".to_string()))?
        .replace(names);

    info!(queued = queued, "Fixture queue replaced");
    Ok(Json(json!({ "queued": queued })))
}

fn parse_fixture_names(body: &[u8]) -> Result<Vec<String>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("Body must be a JSON array: {}", e))?;
    let Value::Array(items) = value else {
        return Err("Body must be a JSON array of fixture names".to_string());
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(name) if is_plain_name(&name) => Ok(name),
            Value::String(name) => Err(format!("Invalid fixture name: {}", name)),
            other => Err(format!("Fixture names must be strings, got {}", other)),
        })
        .collect()
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /auth/o2/token - Always grants a fixed access token
async fn issue_token(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    info!("OAuth token requested");
    let refresh_token = form
        .get("refresh_token")
        .cloned()
        .unwrap_or_else(|| "mock_refresh_token".to_string());

    Json(json!({
        "access_token": MOCK_ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
    }))
}

/// Any other request - Serve the next queued fixture
async fn serve_next_fixture(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, AppError> {
    let next = state
        .queue
        .lock()
        .map_err(|_| AppError::ServerError("Fixture queue lock poisoned".to_string()))?
        .advance();

    let Some(name) = next else {
        info!(method = %method, uri = %uri, "Fixture queue exhausted");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let path = state.fixtures_dir.join(format!("{}.json", name));
    info!(method = %method, uri = %uri, fixture = %name, "Serving fixture");

    let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
        error!(path = %path.display(), error = %e, "Fixture file not readable");
        AppError::ServerError(format!(
            "Mock response file not found: {}",
            path.display()
        ))
    })?;

    let value: Value = serde_json::from_str(&contents).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Fixture file is not valid JSON");
        AppError::ServerError(format!(
            "Invalid JSON in mock response file: {}",
            path.display()
        ))
    })?;

    Ok(Json(value).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_advances_and_resets() {
        let mut queue = FixtureQueue::default();
        assert_eq!(queue.advance(), None);

        queue.replace(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(queue.remaining(), 2);
        assert_eq!(queue.advance().as_deref(), Some("a"));
        assert_eq!(queue.advance().as_deref(), Some("b"));
        assert_eq!(queue.advance(), None);
        assert_eq!(queue.remaining(), 0);

        queue.replace(vec!["c".to_string()]);
        assert_eq!(queue.advance().as_deref(), Some("c"));
    }

    #[test]
    fn fixture_names_must_be_plain_strings() {
        assert_eq!(
            parse_fixture_names(br#"["get_order", "get_rates"]"#).unwrap(),
            vec!["get_order", "get_rates"]
        );
        assert!(parse_fixture_names(br#"[]"#).unwrap().is_empty());
        assert!(parse_fixture_names(br#"{"names": ["a"]}"#).is_err());
        assert!(parse_fixture_names(br#"["a", 1]"#).is_err());
        assert!(parse_fixture_names(br#"["../secrets"]"#).is_err());
        assert!(parse_fixture_names(b"not json").is_err());
    }
}
