//! `execute-sp-api` tool: call any catalogued SP-API operation and describe the
//! outcome as a markdown report.
//!
//! Execution never fails from the caller's point of view. Unknown endpoints,
//! missing parameters, upstream error statuses and transport failures all come
//! back as reports with recommendations.

use super::is_truthy;
use crate::auth::{redact_headers, SpApiAuthenticator};
use crate::catalog::{ApiCatalog, ApiEndpoint, ParameterLocation};
use crate::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::region::SellingRegion;
use crate::serialization::serialize_to_pretty_json_string;
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, error, info, warn};


pub const TOOL_NAME: &str = "execute-sp-api";
pub const TOOL_DESCRIPTION: &str =
    "Execute Amazon Selling Partner API requests with specified endpoint and parameters";

const HIGHLIGHT_FIELDS: &[&str] = &["id", "status", "count", "total", "nextToken", "payload"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }
}

/// Arguments of the `execute-sp-api` tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteParams {
    /// Unique endpoint id (`orders_getOrders`) or bare operation id (`getOrders`)
    pub endpoint: String,
    pub parameters: Map<String, Value>,
    /// Overrides the catalogued method
    #[serde(default)]
    pub method: Option<RequestMethod>,
    #[serde(default)]
    pub additional_headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub raw_mode: bool,
    #[serde(default)]
    pub generate_code: bool,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Outcome of checking supplied parameters against the catalogue.
#[derive(Debug, Default, PartialEq)]
pub struct ParameterValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParameterValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub recommendations: Vec<String>,
}

/// Everything the report needs about one request.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    /// Status code and reason phrase; `None` when no response arrived
    pub status: Option<(u16, String)>,
    pub endpoint_id: String,
    pub method: String,
    pub url: String,
    pub request_body: Option<Value>,
    pub response: Value,
    pub highlights: Vec<String>,
    pub insights: Vec<String>,
    pub next_steps: Vec<String>,
    pub code_snippet: Option<String>,
    pub error: Option<ErrorDetails>,
}

struct UpstreamResponse {
    status: u16,
    reason: String,
    body: Value,
}

pub struct ExecuteApiTool {
    catalog: Arc<ApiCatalog>,
    authenticator: Arc<SpApiAuthenticator>,
    http_client: Client,
    user_agent: String,
}

impl ExecuteApiTool {
    pub fn new(catalog: Arc<ApiCatalog>, authenticator: Arc<SpApiAuthenticator>) -> Self {
        Self {
            catalog,
            authenticator,
            http_client: Client::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Run one request and render the markdown report.
    pub async fn execute(&self, params: &ExecuteParams) -> String {
        debug!(
            endpoint = %params.endpoint,
            region = %params.region,
            raw_mode = params.raw_mode,
            "Executing execute-sp-api tool"
        );

        let Some(endpoint) = self.catalog.find_endpoint(&params.endpoint) else {
            warn!(endpoint = %params.endpoint, "Endpoint not found in catalog");
            return format_error(
                &format!("Endpoint '{}' not found in the catalog", params.endpoint),
                &[],
            );
        };

        let validation = validate_parameters(endpoint, &params.parameters);
        for warning in &validation.warnings {
            warn!(endpoint = %endpoint.id, "{}", warning);
        }
        if !validation.is_valid() {
            return format_error(
                &format!("Parameter validation failed: {}", validation.errors.join(", ")),
                &validation.errors,
            );
        }

        let method = params
            .method
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| endpoint.method.clone());
        let url = build_url(
            self.authenticator.base_url(),
            endpoint,
            &params.parameters,
            &params.region,
        );
        let headers = prepare_headers(
            endpoint,
            &params.parameters,
            params.additional_headers.as_ref(),
            &self.user_agent,
        );
        let body = prepare_body(endpoint, &params.parameters);

        let result = match self.send(&method, &url, headers, body.as_ref()).await {
            Ok(upstream) => completed_result(endpoint, params, &method, &url, body, upstream),
            Err(e) => {
                error!(endpoint = %endpoint.id, error = %e, "Failed to execute SP-API request");
                failed_result(endpoint, &method, &url, body, &e)
            }
        };

        format_result(&result, params)
    }

    async fn send(
        &self,
        method: &str,
        url: &str,
        mut headers: Vec<(String, String)>,
        body: Option<&Value>,
    ) -> Result<UpstreamResponse> {
        self.authenticator.authorize(&mut headers).await?;

        let http_method = Method::from_bytes(method.as_bytes())
            .with_context(|| format!("Invalid HTTP method: {}", method))?;

        info!(
            method = %method,
            url = %url,
            headers = ?redact_headers(&headers),
            "Sending SP-API request"
        );
        if let Some(body) = body {
            debug!(body = %body, "SP-API request body");
        }

        let mut request = self.http_client.request(http_method, url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body).context("Failed to encode request body")?);
        }

        let response = request.send().await.context("Failed to send SP-API request")?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        info!(status = status.as_u16(), reason = %reason, "SP-API response received");

        let text = response
            .text()
            .await
            .context("Failed to read SP-API response body")?;
        debug!(body = %text, "SP-API response body");

        Ok(UpstreamResponse {
            status: status.as_u16(),
            reason,
            body: parse_body(&text),
        })
    }
}

fn completed_result(
    endpoint: &ApiEndpoint,
    params: &ExecuteParams,
    method: &str,
    url: &str,
    request_body: Option<Value>,
    upstream: UpstreamResponse,
) -> ExecutionResult {
    let success = (200..300).contains(&upstream.status);
    let response = upstream.body;

    let error = (!success).then(|| ErrorDetails {
        code: first_error_field(&response, "code")
            .unwrap_or_else(|| upstream.status.to_string()),
        message: first_error_field(&response, "message")
            .unwrap_or_else(|| upstream.reason.clone()),
        recommendations: error_recommendations(upstream.status, &response),
    });

    let code_snippet = params
        .generate_code
        .then(|| generate_code_snippet(method, url, request_body.as_ref(), &endpoint.id));

    ExecutionResult {
        success,
        status: Some((upstream.status, upstream.reason)),
        endpoint_id: endpoint.id.clone(),
        method: method.to_string(),
        url: url.to_string(),
        highlights: extract_highlights(&response, &endpoint.id),
        insights: generate_insights(&response, &endpoint.id, success),
        next_steps: suggest_next_steps(endpoint, success),
        request_body,
        response,
        code_snippet,
        error,
    }
}

fn failed_result(
    endpoint: &ApiEndpoint,
    method: &str,
    url: &str,
    request_body: Option<Value>,
    err: &anyhow::Error,
) -> ExecutionResult {
    let message = format!("{:#}", err);
    ExecutionResult {
        success: false,
        status: None,
        endpoint_id: endpoint.id.clone(),
        method: method.to_string(),
        url: url.to_string(),
        request_body,
        response: Value::Null,
        highlights: Vec::new(),
        insights: vec![
            "The request could not be completed due to an error.".to_string(),
            format!("Error: {}", message),
        ],
        next_steps: vec![
            "Check your authentication credentials".to_string(),
            "Verify your network connection".to_string(),
            "Check if the SP-API service is available".to_string(),
        ],
        code_snippet: None,
        error: Some(ErrorDetails {
            code: transport_error_code(err).to_string(),
            message,
            recommendations: vec![
                "Verify your SP-API credentials".to_string(),
                "Check your AWS credentials if using role-based authentication".to_string(),
                "Make sure you have the correct permissions for this operation".to_string(),
            ],
        }),
    }
}

fn transport_error_code(err: &anyhow::Error) -> &'static str {
    match err.chain().find_map(|e| e.downcast_ref::<reqwest::Error>()) {
        Some(e) if e.is_timeout() => "TIMEOUT",
        Some(e) if e.is_connect() => "CONNECTION_ERROR",
        Some(_) => "REQUEST_ERROR",
        None => "UNKNOWN_ERROR",
    }
}

/// JSON bodies are parsed; anything else is kept as a string, empty as null.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|e| {
        debug!(error = %e, "SP-API response body is not JSON");
        Value::String(text.to_string())
    })
}

fn first_error_field(response: &Value, field: &str) -> Option<String> {
    response
        .pointer(&format!("/errors/0/{}", field))
        .filter(|v| is_truthy(v))
        .map(display_value)
}

/// Plain text for strings, JSON text for everything else.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Required parameters must be present unless the catalogue supplies a
/// default; unknown ones only produce warnings.
pub fn validate_parameters(endpoint: &ApiEndpoint, parameters: &Map<String, Value>) -> ParameterValidation {
    let errors = endpoint
        .parameters
        .iter()
        .filter(|p| p.required && p.default.is_none() && !parameters.contains_key(&p.name))
        .map(|p| format!("Missing required parameter: {}", p.name))
        .collect();

    let warnings = parameters
        .keys()
        .filter(|key| !endpoint.parameters.iter().any(|p| &p.name == *key))
        .map(|key| format!("Unknown parameter: {}", key))
        .collect();

    ParameterValidation { errors, warnings }
}

/// Full request URL with path parameters substituted and query parameters appended.
///
/// Region hints only apply when `base_url` is the default North America host.
/// Array query values repeat the parameter name once per element.
pub fn build_url(
    base_url: &str,
    endpoint: &ApiEndpoint,
    parameters: &Map<String, Value>,
    region: &str,
) -> String {
    let host = if base_url == DEFAULT_BASE_URL {
        SellingRegion::from_hint(region)
            .unwrap_or_else(|| {
                warn!(region = %region, "Unknown region, defaulting to North America endpoint");
                SellingRegion::NorthAmerica
            })
            .endpoint()
    } else {
        base_url
    };

    let mut path = endpoint.path.clone();
    for param in endpoint.parameters_in(ParameterLocation::Path) {
        if let Some(value) = parameters.get(&param.name).filter(|v| is_truthy(v)) {
            let placeholder = format!("{{{}}}", param.name);
            let encoded = urlencoding::encode(&display_value(value)).into_owned();
            path = path.replacen(&placeholder, &encoded, 1);
        }
    }

    let mut query = Vec::new();
    for param in endpoint.parameters_in(ParameterLocation::Query) {
        let Some(value) = parameters.get(&param.name) else {
            continue;
        };
        let name = urlencoding::encode(&param.name);
        match value {
            Value::Array(items) => {
                for item in items {
                    query.push(format!("{}={}", name, urlencoding::encode(&display_value(item))));
                }
            }
            other => query.push(format!("{}={}", name, urlencoding::encode(&display_value(other)))),
        }
    }

    if !query.is_empty() {
        path.push('?');
        path.push_str(&query.join("&"));
    }

    format!("{}{}", host.trim_end_matches('/'), path)
}

/// Standard JSON headers, then header parameters (supplied value, else the
/// default of a required one), then the caller's extra headers. Later entries
/// replace same-named earlier ones regardless of case.
pub fn prepare_headers(
    endpoint: &ApiEndpoint,
    parameters: &Map<String, Value>,
    additional: Option<&BTreeMap<String, String>>,
    user_agent: &str,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), user_agent.to_string()),
    ];

    for param in endpoint.parameters_in(ParameterLocation::Header) {
        let value = parameters
            .get(&param.name)
            .or(param.default.as_ref().filter(|_| param.required));
        if let Some(value) = value {
            set_header(&mut headers, &param.name, display_value(value));
        }
    }

    for (name, value) in additional.into_iter().flatten() {
        set_header(&mut headers, name, value.clone());
    }

    headers
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(existing) => *existing = (name.to_string(), value),
        None => headers.push((name.to_string(), value)),
    }
}

/// Request body for the catalogued method.
///
/// GET and DELETE never carry one. Otherwise the declared body parameter's
/// value is sent as-is, or an object is assembled from every supplied
/// parameter that is not a path, query or header parameter.
pub fn prepare_body(endpoint: &ApiEndpoint, parameters: &Map<String, Value>) -> Option<Value> {
    if endpoint.method == "GET" || endpoint.method == "DELETE" {
        return None;
    }

    if let Some(value) = endpoint
        .parameters_in(ParameterLocation::Body)
        .next()
        .and_then(|p| parameters.get(&p.name))
        .filter(|v| is_truthy(v))
    {
        return Some(value.clone());
    }

    let body: Map<String, Value> = endpoint
        .parameters
        .iter()
        .filter(|p| {
            !matches!(
                p.location,
                ParameterLocation::Path | ParameterLocation::Query | ParameterLocation::Header
            )
        })
        .filter_map(|p| parameters.get(&p.name).map(|v| (p.name.clone(), v.clone())))
        .collect();

    (!body.is_empty()).then_some(Value::Object(body))
}

/// Key fields, array sizes with a sample of the first element, and inventory totals.
pub fn extract_highlights(response: &Value, endpoint_id: &str) -> Vec<String> {
    let Value::Object(fields) = response else {
        return Vec::new();
    };
    let mut highlights = Vec::new();

    for field in HIGHLIGHT_FIELDS {
        if let Some(value) = fields.get(*field) {
            highlights.push(format!("{}: {}", field, value));
        }
    }

    for (key, value) in fields {
        let Value::Array(items) = value else {
            continue;
        };
        highlights.push(format!("{}: {} item(s)", key, items.len()));

        if let Some(Value::Object(sample)) = items.first() {
            let props: Vec<String> = sample
                .iter()
                .take(3)
                .map(|(prop, v)| {
                    let rendered: String = v.to_string().chars().take(50).collect();
                    format!("{}: {}", prop, rendered)
                })
                .collect();
            highlights.push(format!("Sample item properties: {}", props.join(", ")));
        }
    }

    if endpoint_id.contains("Inventory") {
        if let Some(summaries) = inventory_summaries(response) {
            highlights.push(format!("Found {} inventory items", summaries.len()));

            let fulfillable: Vec<i64> = summaries
                .iter()
                .map(|s| quantity(s, "/inventoryDetails/fulfillableQuantity"))
                .filter(|q| *q > 0)
                .collect();
            if !fulfillable.is_empty() {
                highlights.push(format!(
                    "Total fulfillable quantity: {} units across {} SKUs",
                    fulfillable.iter().sum::<i64>(),
                    fulfillable.len()
                ));
            }
        }
    }

    highlights
}

fn inventory_summaries(response: &Value) -> Option<&Vec<Value>> {
    response
        .pointer("/payload/inventorySummaries")
        .and_then(Value::as_array)
}

fn quantity(summary: &Value, pointer: &str) -> i64 {
    summary.pointer(pointer).and_then(Value::as_i64).unwrap_or(0)
}

pub fn generate_insights(response: &Value, endpoint_id: &str, success: bool) -> Vec<String> {
    if !success || !is_truthy(response) {
        return vec!["The request was not successful. Please check the error details.".to_string()];
    }

    let mut insights = vec!["The request was successful.".to_string()];

    if endpoint_id.contains("get") || endpoint_id.contains("list") {
        let has_next = [response.get("nextToken"), response.pointer("/payload/nextToken")]
            .into_iter()
            .flatten()
            .any(is_truthy);
        if has_next {
            insights.push(
                "There are more results available. Use the nextToken parameter to retrieve the next page."
                    .to_string(),
            );
        }

        let item_count = response
            .as_array()
            .or_else(|| response.get("payload").and_then(Value::as_array))
            .or_else(|| response.get("items").and_then(Value::as_array))
            .or_else(|| inventory_summaries(response))
            .map(Vec::len)
            .unwrap_or(0);

        if item_count > 0 {
            insights.push(format!("Retrieved {} item(s).", item_count));
        } else {
            insights.push(
                "No items were retrieved. This could be due to filtering or because there are no items available."
                    .to_string(),
            );
        }
    }

    if endpoint_id.contains("Inventory") {
        if let Some(summaries) = inventory_summaries(response) {
            let unfulfillable: Vec<i64> = summaries
                .iter()
                .map(|s| quantity(s, "/inventoryDetails/unfulfillableQuantity/totalUnfulfillableQuantity"))
                .filter(|q| *q > 0)
                .collect();
            if !unfulfillable.is_empty() {
                insights.push(format!(
                    "Found {} unfulfillable units across {} SKUs. Consider checking these items.",
                    unfulfillable.iter().sum::<i64>(),
                    unfulfillable.len()
                ));
            }

            let reserved = summaries
                .iter()
                .filter(|s| quantity(s, "/inventoryDetails/reservedQuantity/totalReservedQuantity") > 0)
                .count();
            if reserved > 0 {
                insights.push(format!(
                    "{} SKUs have units reserved for customer orders or other processes.",
                    reserved
                ));
            }
        }
    }

    insights
}

pub fn suggest_next_steps(endpoint: &ApiEndpoint, success: bool) -> Vec<String> {
    if !success {
        return vec![
            "Review the error details and fix any issues with your request.".to_string(),
            "Check your authentication credentials.".to_string(),
            "Verify that you have the necessary permissions for this operation.".to_string(),
        ];
    }

    let id = endpoint.id.as_str();
    let mut steps = Vec::new();

    if !endpoint.related_endpoints.is_empty() {
        steps.push("You may want to try these related endpoints:".to_string());
        for related in &endpoint.related_endpoints {
            steps.push(format!("- {}: {}", related.id, related.relationship));
        }
    }

    if id.contains("get") || id.contains("list") {
        steps.push("Use the retrieved data for your business needs.".to_string());
        if id.contains("list") {
            steps.push("Consider retrieving additional pages if nextToken is present.".to_string());
            steps.push("Filter results to narrow down to specific items if needed.".to_string());
        }
    } else if id.contains("create") || id.contains("add") {
        steps.push("Use the ID of the created resource for subsequent operations.".to_string());
        steps.push("Verify the created resource details.".to_string());
    } else if id.contains("update") {
        steps.push("Verify that the update was successful.".to_string());
        steps.push("Retrieve the updated resource to confirm changes.".to_string());
    } else if id.contains("delete") {
        steps.push("Verify that the deletion was successful.".to_string());
    }

    if id.contains("Inventory") {
        steps.push("Consider creating an inbound shipment for low-stock items.".to_string());
        steps.push("Check for unfulfillable inventory and determine the cause.".to_string());
    }

    steps
}

/// Status-specific advice followed by advice for each recognised upstream error code.
pub fn error_recommendations(status: u16, response: &Value) -> Vec<String> {
    let by_status: &[&str] = match status {
        400 => &[
            "Check your request parameters for errors.",
            "Verify that all required parameters are provided.",
            "Ensure parameter formats are correct.",
        ],
        401 => &[
            "Your authentication credentials are invalid or expired.",
            "Refresh your access token and try again.",
        ],
        403 => &[
            "You do not have permission to perform this operation.",
            "Verify that you have the necessary roles and permissions.",
            "Check if you are using the correct marketplace ID.",
        ],
        404 => &[
            "The requested resource was not found.",
            "Verify that the ID or path is correct.",
        ],
        429 => &[
            "You have exceeded the rate limits for this operation.",
            "Implement exponential backoff and retry later.",
            "Consider reducing your request frequency.",
        ],
        500 | 503 => &[
            "Amazon SP-API is experiencing internal issues.",
            "Wait and retry the request later.",
            "Check the Amazon Seller Central status page for service outages.",
        ],
        _ => &[
            "Review the error details for more information.",
            "Check the SP-API documentation for this endpoint.",
        ],
    };

    let mut recommendations: Vec<String> = by_status.iter().map(|s| s.to_string()).collect();

    let errors = response.get("errors").and_then(Value::as_array);
    for error in errors.into_iter().flatten() {
        let advice = match error.get("code").and_then(Value::as_str) {
            Some("InvalidInput") => "One or more input parameters are invalid. Check the error details.",
            Some("AccessDenied") => "You do not have access to this resource. Verify your permissions.",
            Some("QuotaExceeded") => "You have exceeded your quota for this operation. Try again later.",
            Some("ResourceNotFound") => "The requested resource does not exist. Verify your identifiers.",
            _ => continue,
        };
        recommendations.push(advice.to_string());
    }

    recommendations
}

const SNIPPET_TEMPLATE: &str = r#####"// Amazon SP-API client for %ENDPOINT_ID%
use reqwest::{Client, Method};
use serde_json::Value;

async fn get_access_token(client: &Client) -> Result<String, reqwest::Error> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", "YOUR_REFRESH_TOKEN"),
        ("client_id", "YOUR_CLIENT_ID"),
        ("client_secret", "YOUR_CLIENT_SECRET"),
    ];
    let token: Value = client
        .post("https://api.amazon.com/auth/o2/token")
        .form(&params)
        .send()
        .await?
        .json()
        .await?;
    Ok(token["access_token"].as_str().unwrap_or_default().to_string())
}

async fn %FUNCTION%(client: &Client) -> Result<Value, reqwest::Error> {
    let access_token = get_access_token(client).await?;
    let response = client
        .request(Method::%METHOD%, "%URL%")
        .header("x-amz-access-token", access_token)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .header("User-Agent", "YourApp/1.0.0")
%BODY%        .send()
        .await?;

    println!("Response status: {}", response.status());
    let data: Value = response.json().await?;
    println!("Response data: {:#}", data);
    Ok(data)
}

#[tokio::main]
async fn main() {
    let client = Client::new();
    match %FUNCTION%(&client).await {
        Ok(_) => println!("Operation completed successfully"),
        Err(e) => eprintln!("Operation failed: {}", e),
    }
}"#####;

/// Standalone Rust program reproducing the request with `reqwest`.
pub fn generate_code_snippet(method: &str, url: &str, body: Option<&Value>, endpoint_id: &str) -> String {
    let body_line = body
        .map(|b| format!("        .body({})\n", raw_string_literal(&serialize_to_pretty_json_string(b))))
        .unwrap_or_default();

    SNIPPET_TEMPLATE
        .replace("%ENDPOINT_ID%", endpoint_id)
        .replace("%FUNCTION%", &format!("execute_{}", snake_case(endpoint_id)))
        .replace("%METHOD%", &method.to_uppercase())
        .replace("%URL%", &url.replace('\\', "\\\\").replace('"', "\\\""))
        .replace("%BODY%", &body_line)
}

/// `r#"..."#` literal with enough hashes that `text` cannot terminate it early.
fn raw_string_literal(text: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in text.chars() {
        run = match (c, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n);
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

/// `fbaInventory_getInventorySummaries` -> `fba_inventory_get_inventory_summaries`
fn snake_case(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 8);
    for c in id.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}

/// Report for requests rejected before anything was sent.
pub fn format_error(message: &str, details: &[String]) -> String {
    let mut out = String::from("# SP-API Request Error\n\n");
    let _ = write!(out, "## Error Message\n{}\n\n", message);

    if !details.is_empty() {
        out.push_str("## Details\n");
        for detail in details {
            let _ = writeln!(out, "- {}", detail);
        }
        out.push('\n');
    }

    out.push_str("## Recommendations\n");
    out.push_str("- Verify your endpoint ID and parameters\n");
    out.push_str("- Check the SP-API documentation for correct usage\n");
    out.push_str("- Ensure your authentication credentials are correct\n");
    out
}

pub fn format_result(result: &ExecutionResult, params: &ExecuteParams) -> String {
    let mut out = String::new();
    let (title, icon) = if result.success {
        ("Response", "✅")
    } else {
        ("Error", "❌")
    };

    let _ = write!(out, "# SP-API {}\n\n", title);
    match &result.status {
        Some((code, reason)) => {
            let _ = write!(out, "{} **Status**: {} {}\n\n", icon, code, reason);
        }
        None => {
            let _ = write!(out, "{} **Status**: No response received\n\n", icon);
        }
    }

    out.push_str("## Request Details\n");
    let _ = writeln!(out, "- **Endpoint**: {}", result.endpoint_id);
    let _ = writeln!(out, "- **Method**: {}", result.method);
    let _ = writeln!(out, "- **URL**: {}", result.url);

    out.push_str("\n### Parameters\n");
    let _ = write!(
        out,
        "```json\n{}\n```\n\n",
        serialize_to_pretty_json_string(&params.parameters)
    );

    out.push_str("## Response\n");
    if result.success {
        push_list(&mut out, "### Highlights", &result.highlights);
        out.push_str("### Response Body\n");
        let _ = write!(
            out,
            "```json\n{}\n```\n\n",
            serialize_to_pretty_json_string(&result.response)
        );
    } else if let Some(error) = &result.error {
        out.push_str("### Error\n");
        let _ = writeln!(out, "- **Code**: {}", error.code);
        let _ = write!(out, "- **Message**: {}\n\n", error.message);
        out.push_str("### Recommendations\n");
        for recommendation in &error.recommendations {
            let _ = writeln!(out, "- {}", recommendation);
        }
        out.push('\n');
    }

    push_list(&mut out, "## Insights", &result.insights);
    push_list(&mut out, "## Next Steps", &result.next_steps);

    if let Some(snippet) = &result.code_snippet {
        out.push_str("## Code Snippet\n");
        let _ = writeln!(out, "```rust\n{}\n```", snippet);
    }

    out
}

fn push_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
    out.push('\n');
}
