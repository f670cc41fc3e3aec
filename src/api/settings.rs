use crate::serialization::serialize_to_json_string;
use crate::settings::SettingsStore;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Request header carrying the JSON-serialized settings bundle.
pub const SETTINGS_HEADER: &str = "settings";

/// Shared state for the settings API
#[derive(Clone)]
pub struct SettingsAppState {
    pub store: Arc<SettingsStore>,
    /// Secret name the bundle is stored under
    pub secret_name: String,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

enum AppError {
    BadRequest(String),
    NotFound(String),
    ServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

/// Create settings API router
pub fn create_settings_router(state: SettingsAppState) -> Router {
    Router::new()
        .route(
            "/api/settings",
            get(get_settings).post(create_settings).put(update_settings),
        )
        .with_state(Arc::new(state))
}

/// GET /api/settings - Return the stored bundle
async fn get_settings(
    State(state): State<Arc<SettingsAppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    match state.store.get(&state.secret_name) {
        Ok(Some(secret)) => Ok(Json(json!({ "settings": secret.secret_string }))),
        Ok(None) => {
            info!(name = %state.secret_name, "Settings secret not found");
            Err(AppError::NotFound(
                "The Secret is not found in the settings store.".to_string(),
            ))
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Failed to read settings");
            Err(internal_error())
        }
    }
}

/// POST /api/settings - Create the bundle from the `settings` header
async fn create_settings(
    State(state): State<Arc<SettingsAppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let settings = settings_header(&headers)?;

    state
        .store
        .create(&state.secret_name, settings)
        .map_err(|e| {
            error!(error = %format!("{:#}", e), "Failed to create settings");
            internal_error()
        })?;

    Ok(empty_data())
}

/// PUT /api/settings - Replace the bundle from the `settings` header
async fn update_settings(
    State(state): State<Arc<SettingsAppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let settings = settings_header(&headers)?;

    state
        .store
        .put(&state.secret_name, settings)
        .map_err(|e| {
            error!(error = %format!("{:#}", e), "Failed to update settings");
            internal_error()
        })?;

    Ok(empty_data())
}

fn settings_header(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(SETTINGS_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            warn!("Settings header missing or empty");
            AppError::BadRequest(
                "Invalid Inputs. Settings cannot be empty|null|undefined.".to_string(),
            )
        })
}

fn empty_data() -> Response {
    let body = serialize_to_json_string(&json!({ "data": {} }));
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn internal_error() -> AppError {
    AppError::ServerError("Internal Server Error".to_string())
}
