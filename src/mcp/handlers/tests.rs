use super::*;
use crate::auth::SpApiAuthenticator;
use crate::catalog::load_catalog;
use crate::config::{SpApiCredentials, DEFAULT_BASE_URL};
use crate::mcp::types::{RequestId, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND};
use std::path::Path;
use std::sync::Arc;

fn handler() -> McpHandler {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog");
    let catalog = Arc::new(load_catalog(&dir).unwrap());
    let credentials = SpApiCredentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "refresh".to_string(),
        base_url: DEFAULT_BASE_URL.to_string(),
        oauth_url: "http://127.0.0.1:9/auth/o2/token".to_string(),
    };
    McpHandler::new(
        ExecuteApiTool::new(catalog.clone(), Arc::new(SpApiAuthenticator::new(credentials))),
        ExploreCatalogTool::new(catalog),
    )
}

fn request(id: i64, method: &str, params: Value) -> McpRequest {
    McpRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(RequestId::Number(id)),
        method: method.to_string(),
        params,
    }
}

#[test]
fn initialize_echoes_supported_version() {
    let result = handle_initialize(&json!({"protocolVersion": "2024-11-05"})).unwrap();

    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "amazon-sp-api");
    assert_eq!(result["serverInfo"]["version"], "0.1.0");
    assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
}

#[test]
fn initialize_offers_latest_for_unknown_version() {
    let result = handle_initialize(&json!({"protocolVersion": "1999-01-01"})).unwrap();
    assert_eq!(result["protocolVersion"], "2025-06-18");

    let err = handle_initialize(&json!({})).unwrap_err();
    assert_eq!(err.code, INVALID_PARAMS);
}

#[test]
fn tools_list_describes_both_tools() {
    let list = handle_tools_list();
    let tools = list["tools"].as_array().unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "execute-sp-api");
    assert_eq!(
        tools[0]["description"],
        "Execute Amazon Selling Partner API requests with specified endpoint and parameters"
    );
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["endpoint", "parameters"]));
    assert_eq!(tools[1]["name"], "explore-sp-api-catalog");
    assert!(tools[1]["inputSchema"]["properties"].get("ref").is_some());
}

#[tokio::test]
async fn ping_and_unknown_method() {
    let handler = handler();

    let pong = handler.handle(request(1, "ping", Value::Null)).await.unwrap();
    assert_eq!(pong.result, Some(json!({})));

    let missing = handler.handle(request(2, "resources/list", Value::Null)).await.unwrap();
    let error = missing.error.unwrap();
    assert_eq!(error.code, METHOD_NOT_FOUND);
    assert_eq!(error.message, "Method not found: resources/list");
    assert_eq!(missing.id, Some(RequestId::Number(2)));
}

#[tokio::test]
async fn notifications_get_no_response() {
    let handler = handler();
    let note = McpRequest {
        jsonrpc: "2.0".to_string(),
        id: None,
        method: "notifications/initialized".to_string(),
        params: Value::Null,
    };
    assert!(handler.handle(note).await.is_none());
}

#[tokio::test]
async fn wrong_jsonrpc_version_is_invalid_request() {
    let handler = handler();
    let mut req = request(3, "ping", Value::Null);
    req.jsonrpc = "1.0".to_string();

    let response = handler.handle(req).await.unwrap();
    assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
}

#[tokio::test]
async fn explore_tool_call_returns_text_content() {
    let handler = handler();
    let response = handler
        .handle(request(
            4,
            "tools/call",
            json!({"name": "explore-sp-api-catalog", "arguments": {"listCategories": true}}),
        ))
        .await
        .unwrap();

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["type"], "text");
    assert!(result["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("# All SP-API Categories"));
}

#[tokio::test]
async fn explore_without_arguments_gives_overview() {
    let handler = handler();
    let response = handler
        .handle(request(5, "tools/call", json!({"name": "explore-sp-api-catalog"})))
        .await
        .unwrap();

    let text = response.result.unwrap()["content"][0]["text"].clone();
    assert!(text.as_str().unwrap().starts_with("# Amazon SP-API Catalog Overview"));
}

#[tokio::test]
async fn invalid_arguments_are_invalid_params() {
    let handler = handler();

    let bad_depth = handler
        .handle(request(
            6,
            "tools/call",
            json!({"name": "explore-sp-api-catalog", "arguments": {"endpoint": "getOrder", "depth": -3}}),
        ))
        .await
        .unwrap();
    let error = bad_depth.error.unwrap();
    assert_eq!(error.code, INVALID_PARAMS);
    assert!(error.message.contains("Depth must be non-negative. Received: -3"));

    let missing_parameters = handler
        .handle(request(
            7,
            "tools/call",
            json!({"name": "execute-sp-api", "arguments": {"endpoint": "getOrder"}}),
        ))
        .await
        .unwrap();
    assert_eq!(missing_parameters.error.unwrap().code, INVALID_PARAMS);

    let unknown = handler
        .handle(request(8, "tools/call", json!({"name": "delete-everything"})))
        .await
        .unwrap();
    assert_eq!(unknown.error.unwrap().message, "Unknown tool: delete-everything");

    let nameless = handler.handle(request(9, "tools/call", json!({}))).await.unwrap();
    assert_eq!(nameless.error.unwrap().message, "Missing 'name' parameter");
}

#[tokio::test]
async fn execute_reports_are_tool_output() {
    let handler = handler();
    let response = handler
        .handle(request(
            10,
            "tools/call",
            json!({"name": "execute-sp-api", "arguments": {"endpoint": "getOrder", "parameters": {}}}),
        ))
        .await
        .unwrap();

    let result = response.result.unwrap();
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("# SP-API Request Error"));
    assert!(text.contains("Missing required parameter: orderId"));
}
