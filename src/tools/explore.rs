//! `explore-sp-api-catalog` tool: browse categories and endpoints of the
//! bundled catalog, with schema depth limiting and dot-path reference
//! extraction for large response models.

use super::truncate_description;
use crate::catalog::{ApiCatalog, ApiEndpoint, ParameterLocation};
use crate::config::DEFAULT_MAX_TOKENS;
use crate::serialization::{serialize_to_json_string, serialize_to_pretty_json_string};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::{debug, warn};


pub const TOOL_NAME: &str = "explore-sp-api-catalog";
pub const TOOL_DESCRIPTION: &str = "Get information about SP-API endpoints and parameters";

const ARRAY_MARKER: &str = "[Array] - Use greater depth to expand";
const OBJECT_MARKER_PREFIX: &str = "[Object: ";
const OBJECT_MARKER_SUFFIX: &str = "] - Use greater depth or ref parameter to expand";

/// How far nested schema objects are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    Level(usize),
    #[default]
    Full,
}

impl Depth {
    /// Accepts non-negative numbers, numeric strings and `"full"`.
    ///
    /// Errors are JSON documents carrying a message and valid examples, so
    /// they can be handed back to the caller verbatim.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Err(missing_depth("null")),
            Value::String(s) if s.is_empty() => Err(missing_depth("")),
            Value::String(s) if s == "full" => Ok(Depth::Full),
            Value::Number(n) => {
                let level = n.as_f64().unwrap_or(0.0);
                if level < 0.0 {
                    return Err(invalid_depth(
                        format!("Depth must be non-negative. Received: {}", n),
                        json!([{"depth": 0}, {"depth": 1}, {"depth": 2}]),
                    ));
                }
                Ok(Depth::Level(level.ceil() as usize))
            }
            Value::String(s) => match parse_leading_int(s) {
                Some(n) if n >= 0 => Ok(Depth::Level(n as usize)),
                _ => Err(unparseable_depth(s)),
            },
            other => Err(unparseable_depth(&other.to_string())),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Level(n) => write!(f, "{}", n),
            Depth::Full => f.write_str("full"),
        }
    }
}

impl Serialize for Depth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Depth::Level(n) => serializer.serialize_u64(*n as u64),
            Depth::Full => serializer.serialize_str("full"),
        }
    }
}

impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Depth::from_value(&value).map_err(D::Error::custom)
    }
}

fn invalid_depth(message: String, valid_examples: Value) -> String {
    serialize_to_json_string(&json!({
        "error": "Invalid depth parameter",
        "message": message,
        "validExamples": valid_examples,
    }))
}

fn missing_depth(received: &str) -> String {
    invalid_depth(
        format!(
            "The 'depth' parameter must be a number (0, 1, 2, etc.) or the string 'full'. Received: {}. TIP: To get full expansion, simply OMIT the depth parameter entirely - do not pass null/undefined.",
            received
        ),
        json!([
            {"endpoint": "orders_getOrder"},
            {"endpoint": "orders_getOrder", "depth": 2},
            {"endpoint": "orders_getOrder", "depth": "full"}
        ]),
    )
}

fn unparseable_depth(received: &str) -> String {
    invalid_depth(
        format!(
            "The 'depth' parameter must be a number (0, 1, 2, etc.) or the string 'full'. Received: \"{}\". Cannot parse as valid number. TIP: To get full expansion, simply OMIT the depth parameter entirely.",
            received
        ),
        json!([
            {"endpoint": "orders_getOrder"},
            {"endpoint": "orders_getOrder", "depth": "full"},
            {"endpoint": "orders_getOrder", "depth": 2}
        ]),
    )
}

/// Leading integer of `text` ("2", " 3x", "-1"), `None` when there are no digits.
fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let n: i64 = digits.parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Arguments of the `explore-sp-api-catalog` tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreParams {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub list_endpoints: bool,
    #[serde(default)]
    pub list_categories: bool,
    #[serde(default)]
    pub depth: Depth,
    /// Dot path into the success response schema, e.g. `properties.payload`
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub struct ExploreCatalogTool {
    catalog: Arc<ApiCatalog>,
    max_tokens: usize,
}

impl ExploreCatalogTool {
    pub fn new(catalog: Arc<ApiCatalog>) -> Self {
        Self {
            catalog,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn execute(&self, params: &ExploreParams) -> String {
        debug!(?params, "Executing explore-sp-api-catalog tool");

        let endpoint = non_empty(&params.endpoint);
        if let (Some(endpoint), Some(reference)) = (endpoint, non_empty(&params.reference)) {
            return self.extract_reference(endpoint, reference, params);
        }

        if let Some(endpoint) = endpoint {
            let details = self.endpoint_details(endpoint, params.depth);
            self.check_response_size(details, params)
        } else if let Some(category) = non_empty(&params.category) {
            self.category_details(category)
        } else if params.list_endpoints {
            self.list_all_endpoints()
        } else if params.list_categories {
            self.list_all_categories()
        } else {
            self.overview()
        }
    }

    /// Oversized output is replaced by a JSON report suggesting narrower queries.
    fn check_response_size(&self, result: String, params: &ExploreParams) -> String {
        let estimated_tokens = result.encode_utf16().count().div_ceil(4);
        if estimated_tokens <= self.max_tokens {
            return result;
        }

        let endpoint = non_empty(&params.endpoint).unwrap_or_default();
        warn!(
            endpoint = %endpoint,
            estimated_tokens,
            max_tokens = self.max_tokens,
            "Explorer response exceeds token limit"
        );

        let truncated = truncated_fields(&result);

        let mut progressive = match params.depth {
            Depth::Full => vec![
                "Try depth: 1 for overview".to_string(),
                "Try depth: 2 for moderate detail".to_string(),
            ],
            Depth::Level(d) => vec![
                format!("Try depth: {} for less detail", d.saturating_sub(1)),
                format!("Try depth: {} for more detail", d + 1),
            ],
        };
        progressive.push("Try depth: 'full' for complete expansion (may still truncate)".to_string());

        let mut targeted = vec![
            "Use ref: 'properties.payload' for main response data".to_string(),
            "Use ref: 'properties.errors' for error structure".to_string(),
        ];
        targeted.extend(ref_suggestions(endpoint));

        serialize_to_pretty_json_string(&json!({
            "endpoint": endpoint,
            "status": "truncated",
            "reason": format!(
                "Response size ({} tokens) exceeds limit ({} tokens)",
                group_thousands(estimated_tokens),
                group_thousands(self.max_tokens)
            ),
            "metadata": {
                "truncatedFields": truncated,
                "currentDepth": params.depth,
                "suggestedActions": actionable_suggestions(params, &truncated),
            },
            "suggestions": {
                "progressive_exploration": progressive,
                "targeted_investigation": targeted,
            },
            "schema": "[TRUNCATED - Use suggested approaches above]",
        }))
    }

    fn extract_reference(&self, endpoint_id: &str, ref_path: &str, params: &ExploreParams) -> String {
        let Some((endpoint, _)) = self.catalog.endpoint_with_category(endpoint_id) else {
            return format!(
                "# Reference Not Found\n\nThe endpoint '{}' was not found in the catalog.",
                endpoint_id
            );
        };

        let Some(schema) = endpoint.success_response().and_then(|r| r.schema.as_ref()) else {
            let available: Vec<Value> = endpoint
                .responses
                .iter()
                .map(|r| json!({"status": r.status_code, "has_schema": r.schema.is_some()}))
                .collect();
            return serialize_to_pretty_json_string(&json!({
                "ref": ref_path,
                "endpoint": endpoint_id,
                "error": "No schema found for successful response",
                "available_responses": available,
            }));
        };

        let Some(extracted) = navigate_schema_path(schema, ref_path) else {
            debug!(endpoint = %endpoint.id, path = %ref_path, "Schema path not found");
            return serialize_to_pretty_json_string(&json!({
                "ref": ref_path,
                "endpoint": endpoint_id,
                "error": format!("Path '{}' not found in schema", ref_path),
                "suggestions": path_suggestions(schema, ref_path),
                "navigation_context": location_context(schema, ""),
            }));
        };

        let limited = limit_schema_depth(extracted, params.depth);
        let compact = limited.to_string();
        let schema_truncated = compact.contains("[Object:") || compact.contains("[Array]");

        serialize_to_pretty_json_string(&json!({
            "ref": ref_path,
            "endpoint": endpoint_id,
            "path_found": true,
            "schema": limited,
            "navigation_context": location_context(extracted, ref_path),
            "metadata": {
                "depth_applied": params.depth,
                "schema_truncated": schema_truncated,
                "suggestions": actionable_suggestions(params, &[]),
            },
        }))
    }

    fn endpoint_details(&self, endpoint_id: &str, depth: Depth) -> String {
        let Some((endpoint, category)) = self.catalog.endpoint_with_category(endpoint_id) else {
            return format!(
                "# Endpoint Not Found\n\nThe endpoint '{}' was not found in the catalog. Please check the endpoint ID and try again.",
                endpoint_id
            );
        };

        let mut out = String::new();
        let _ = write!(out, "# Endpoint: {}\n\n", endpoint.name);
        let _ = writeln!(out, "**ID**: `{}`", endpoint.id);
        let _ = writeln!(out, "**Category**: {}", category);
        let _ = writeln!(out, "**Method**: {}", endpoint.method);
        let _ = write!(out, "**Path**: `{}`\n\n", endpoint.path);

        let _ = write!(out, "## Description\n{}\n\n", endpoint.description);
        let _ = write!(out, "## Purpose\n{}\n\n", endpoint.purpose);

        if !endpoint.common_use_cases.is_empty() {
            out.push_str("## Common Use Cases\n");
            for use_case in &endpoint.common_use_cases {
                let _ = writeln!(out, "- {}", use_case);
            }
            out.push('\n');
        }

        if !endpoint.parameters.is_empty() {
            out.push_str("## Parameters\n");
            write_parameters(&mut out, endpoint, depth);
        }

        if !endpoint.responses.is_empty() {
            out.push_str("## Responses\n");
            for response in &endpoint.responses {
                let _ = writeln!(out, "### Status {}", response.status_code);
                let _ = write!(out, "{}\n\n", response.description);

                if !response.headers.is_empty() {
                    out.push_str("**Headers:**\n");
                    for (name, header) in &response.headers {
                        let _ = writeln!(
                            out,
                            "- `{}`: {} - {}",
                            name, header.header_type, header.description
                        );
                    }
                    out.push('\n');
                }

                if let Some(schema) = response.schema.as_ref().filter(|s| has_entries(s)) {
                    let _ = write!(
                        out,
                        "Response Schema: ```json\n{}\n```\n\n",
                        serialize_to_pretty_json_string(&limit_schema_depth(schema, depth))
                    );
                }
            }
        }

        if !endpoint.related_endpoints.is_empty() {
            out.push_str("## Related Endpoints\n");
            for related in &endpoint.related_endpoints {
                let _ = writeln!(out, "- `{}` - {}", related.id, related.relationship);
            }
            out.push('\n');
        }

        out.push_str("## Version Information\n");
        let _ = writeln!(out, "- Current Version: {}", endpoint.version.current);
        if !endpoint.version.deprecated.is_empty() {
            let _ = writeln!(
                out,
                "- Deprecated Versions: {}",
                endpoint.version.deprecated.join(", ")
            );
        }
        if !endpoint.version.beta.is_empty() {
            let _ = writeln!(out, "- Beta Versions: {}", endpoint.version.beta.join(", "));
        }

        out
    }

    fn category_details(&self, name: &str) -> String {
        let Some(category) = self.catalog.category_by_name(name) else {
            return format!(
                "# Category Not Found\n\nThe category '{}' was not found in the catalog. Please check the category name and try again.\n\n## Available Categories\n{}",
                name,
                self.categories_table()
            );
        };

        let mut out = String::new();
        let _ = write!(out, "# Category: {}\n\n", category.name);
        let _ = write!(out, "{}\n\n", category.description);
        let _ = write!(out, "## Endpoints ({})\n\n", category.endpoints.len());

        if category.endpoints.is_empty() {
            out.push_str("No endpoints found in this category.\n");
        } else {
            write_endpoint_table(&mut out, &category.endpoints);
        }

        if !category.subcategories.is_empty() {
            out.push_str("\n## Subcategories\n\n");
            for sub in &category.subcategories {
                let _ = writeln!(out, "### {}", sub.name);
                let _ = write!(out, "{}\n\n", sub.description);
                if sub.endpoints.is_empty() {
                    out.push_str("No endpoints found in this subcategory.\n");
                } else {
                    write_endpoint_table(&mut out, &sub.endpoints);
                }
            }
        }

        out
    }

    fn list_all_endpoints(&self) -> String {
        let mut out = String::from("# All SP-API Endpoints\n\n");
        let _ = write!(out, "Total endpoints: {}\n\n", self.top_level_endpoints());

        for category in &self.catalog.categories {
            let _ = write!(out, "## {} ({})\n\n", category.name, category.endpoints.len());

            if category.endpoints.is_empty() {
                out.push_str("No endpoints found in this category.\n\n");
                continue;
            }

            out.push_str("| Endpoint ID | Name | Method | Path |\n");
            out.push_str("| ----------- | ---- | ------ | ---- |\n");
            for endpoint in &category.endpoints {
                let _ = writeln!(
                    out,
                    "| `{}` | {} | {} | `{}` |",
                    endpoint.id, endpoint.name, endpoint.method, endpoint.path
                );
            }
            out.push('\n');
        }

        out
    }

    fn list_all_categories(&self) -> String {
        let mut out = String::from("# All SP-API Categories\n\n");
        let _ = write!(out, "Total categories: {}\n\n", self.catalog.categories.len());
        out.push_str("| Category | Description | Endpoints Count |\n");
        out.push_str("| -------- | ----------- | -------------- |\n");

        for category in &self.catalog.categories {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                category.name,
                truncate_description(&category.description),
                category.endpoints.len()
            );

            for sub in &category.subcategories {
                let head: String = sub.description.chars().take(97).collect();
                let _ = writeln!(
                    out,
                    "| {} > {} | {}... | {} |",
                    category.name,
                    sub.name,
                    head,
                    sub.endpoints.len()
                );
            }
        }

        out
    }

    fn overview(&self) -> String {
        let mut out = String::from("# Amazon SP-API Catalog Overview\n\n");
        out.push_str("The Amazon Selling Partner API (SP-API) provides a suite of APIs for managing your Amazon seller account programmatically. ");
        let _ = write!(
            out,
            "This catalog contains {} categories with a total of {} endpoints.\n\n",
            self.catalog.categories.len(),
            self.top_level_endpoints()
        );

        out.push_str("## Categories\n\n");
        out.push_str(&self.categories_table());

        out.push_str("\n## How to Explore the Catalog\n\n");
        out.push_str("You can explore the SP-API catalog using the following options:\n\n");
        out.push_str("1. **Get category details**: Use `explore-sp-api-catalog` with the `category` parameter to view all endpoints in a specific category\n");
        out.push_str("2. **Get endpoint details**: Use `explore-sp-api-catalog` with the `endpoint` parameter to get detailed information about a specific endpoint\n");
        out.push_str("3. **List all endpoints**: Use `explore-sp-api-catalog` with `listEndpoints: true` to see all available endpoints\n\n");

        out.push_str("## Example Usage\n\n");
        out.push_str("To explore a category:\n");
        out.push_str("```json\n{\"category\": \"FBA Inventory\"}\n```\n\n");
        out.push_str("To get endpoint details:\n");
        out.push_str("```json\n{\"endpoint\": \"getInventorySummaries\"}\n```\n\n");
        out.push_str("To list all endpoints:\n");
        out.push_str("```json\n{\"listEndpoints\": true}\n```\n");

        out
    }

    fn categories_table(&self) -> String {
        let mut out = String::from("| Category | Description | Endpoints |\n");
        out.push_str("| -------- | ----------- | --------- |\n");
        for category in &self.catalog.categories {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                category.name,
                truncate_description(&category.description),
                category.endpoints.len()
            );
        }
        out
    }

    /// Listings and the overview count category endpoints only, not subcategories.
    fn top_level_endpoints(&self) -> usize {
        self.catalog.categories.iter().map(|c| c.endpoints.len()).sum()
    }
}

fn write_parameters(out: &mut String, endpoint: &ApiEndpoint, depth: Depth) {
    let groups = [
        ("Path", ParameterLocation::Path),
        ("Query", ParameterLocation::Query),
        ("Body", ParameterLocation::Body),
        ("Header", ParameterLocation::Header),
    ];

    for (heading, location) in groups {
        let mut params = endpoint.parameters_in(location).peekable();
        if params.peek().is_none() {
            continue;
        }

        let _ = writeln!(out, "### {} Parameters", heading);
        for param in params {
            let _ = writeln!(
                out,
                "- `{}` ({}, {}) - {}",
                param.name,
                if param.required { "Required" } else { "Optional" },
                param.param_type,
                param.description
            );
            if location == ParameterLocation::Body {
                if let Some(schema) = &param.schema {
                    let _ = writeln!(
                        out,
                        "  Schema: ```json\n{}\n```",
                        serialize_to_pretty_json_string(&limit_schema_depth(schema, depth))
                    );
                }
            }
        }
        out.push('\n');
    }
}

fn write_endpoint_table(out: &mut String, endpoints: &[ApiEndpoint]) {
    out.push_str("| Endpoint ID | Name | Method | Description |\n");
    out.push_str("| ----------- | ---- | ------ | ----------- |\n");
    for endpoint in endpoints {
        let _ = writeln!(
            out,
            "| `{}` | {} | {} | {} |",
            endpoint.id,
            endpoint.name,
            endpoint.method,
            truncate_description(&endpoint.description)
        );
    }
}

fn has_entries(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Replace objects and arrays nested `depth` levels down with short markers.
pub fn limit_schema_depth(schema: &Value, depth: Depth) -> Value {
    match depth {
        Depth::Full => schema.clone(),
        Depth::Level(max) => limit_level(schema, max, 0),
    }
}

fn limit_level(value: &Value, max: usize, current: usize) -> Value {
    if current >= max {
        return match value {
            Value::Array(_) => Value::String(ARRAY_MARKER.to_string()),
            Value::Object(map) if !map.is_empty() => {
                let mut hints: Vec<&str> = map.keys().take(3).map(String::as_str).collect();
                if map.len() > 3 {
                    hints.push("...");
                }
                Value::String(format!(
                    "{}{} properties ({}){}",
                    OBJECT_MARKER_PREFIX,
                    map.len(),
                    hints.join(", "),
                    OBJECT_MARKER_SUFFIX
                ))
            }
            other => other.clone(),
        };
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| limit_level(item, max, current + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), limit_level(item, max, current + 1)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Distinct depth markers present in rendered output.
fn truncated_fields(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for (start, _) in text.match_indices(OBJECT_MARKER_PREFIX) {
        let rest = &text[start..];
        let Some(end) = rest.find(OBJECT_MARKER_SUFFIX) else {
            continue;
        };
        let marker = &rest[..end + OBJECT_MARKER_SUFFIX.len()];
        if !marker.contains('\n') && !found.iter().any(|f| f == marker) {
            found.push(marker.to_string());
        }
    }

    if text.contains(ARRAY_MARKER) {
        found.push(ARRAY_MARKER.to_string());
    }

    found
}

fn actionable_suggestions(params: &ExploreParams, truncated: &[String]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !truncated.is_empty() {
        suggestions.push(format!(
            "Found {} truncated field(s) - try increasing depth",
            truncated.len()
        ));
    }

    match params.depth {
        Depth::Level(d) => {
            suggestions.push(format!(
                "Current depth: {}, try depth: {} or higher for more detail",
                d,
                d + 2
            ));
            suggestions.push("Try depth: 'full' for complete expansion".to_string());
        }
        Depth::Full => {
            suggestions.push("Using 'full' depth - response may be truncated due to size limits".to_string());
            suggestions.push("Use 'ref' parameter to explore specific sections".to_string());
        }
    }

    if non_empty(&params.endpoint).is_some() && non_empty(&params.reference).is_none() {
        suggestions.push(
            "Use 'ref' parameter to explore specific nested objects (e.g., 'properties.payload')"
                .to_string(),
        );
    }

    suggestions
}

fn ref_suggestions(endpoint_id: &str) -> Vec<String> {
    let suggestions: &[&str] = if endpoint_id.contains("Order") {
        &[
            "Try: --ref Order.ShippingAddress for shipping details",
            "Try: --ref Order.BuyerInfo for buyer information",
            "Try: --ref Order.PaymentExecutionDetail for payment info",
        ]
    } else if endpoint_id.contains("Inventory") {
        &[
            "Try: --ref InventorySummary.TotalQuantity for quantities",
            "Try: --ref InventorySummary.Condition for item conditions",
        ]
    } else {
        &[
            "Try: --ref properties.payload for main data structure",
            "Try: --ref properties.errors for error definitions",
        ]
    };
    suggestions.iter().map(|s| s.to_string()).collect()
}

/// Follow a dot path through object keys and array indices.
fn navigate_schema_path<'a>(schema: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = schema;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// Schema type at a location and the dot paths reachable from it.
fn location_context(schema: &Value, current_path: &str) -> Value {
    let map = match schema {
        Value::Object(map) => map,
        Value::Array(_) => return json!({"schema_type": "unknown", "available_next_steps": []}),
        _ => return json!({"available_next_steps": []}),
    };

    let prefix = if current_path.is_empty() {
        String::new()
    } else {
        format!("{}.", current_path)
    };

    let mut next_steps: Vec<String> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .keys()
                .map(|field| format!("{}properties.{}", prefix, field))
                .collect()
        })
        .unwrap_or_default();

    if map.get("items").is_some_and(|items| !items.is_null()) {
        next_steps.push(format!("{}items", prefix));
    }

    let schema_type = map
        .get("type")
        .filter(|t| super::is_truthy(t))
        .cloned()
        .unwrap_or_else(|| Value::String("unknown".to_string()));

    json!({
        "schema_type": schema_type,
        "available_next_steps": next_steps,
    })
}

/// Top-level keys resembling the first segment of a path that did not resolve.
fn path_suggestions(schema: &Value, attempted: &str) -> Vec<String> {
    let Value::Object(map) = schema else {
        return Vec::new();
    };
    let first = attempted.split('.').next().unwrap_or_default().to_lowercase();

    let exact: Vec<&String> = map.keys().filter(|k| k.to_lowercase() == first).collect();
    let partial = map.keys().filter(|k| {
        let key = k.to_lowercase();
        key.contains(&first) || first.contains(&key)
    });

    let mut suggestions: Vec<&String> = exact.clone();
    suggestions.extend(partial.filter(|k| !exact.contains(k)));
    if suggestions.len() < 3 {
        let room = 5 - suggestions.len();
        suggestions.extend(map.keys().take(room));
    }

    let mut unique: Vec<String> = Vec::new();
    for key in suggestions {
        if !unique.iter().any(|u| u == key) {
            unique.push(key.clone());
        }
    }
    unique
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
