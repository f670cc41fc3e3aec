//! Maps processed model documents onto the catalog types.

use super::model::{
    ApiCatalog, ApiCategory, ApiEndpoint, ApiParameter, ApiResponse, IntentMapping,
    ParameterLocation, RelatedEndpoint, ResponseHeader, UsageExample, VersionInfo,
};
use super::swagger::{SwaggerDocument, HTTP_METHODS};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

const TITLE_PREFIX: &str = "selling partner api for ";

const USE_CASE_MARKERS: &[&str] = &[
    "use this to",
    "allows you to",
    "enables you to",
    "can be used to",
    "use case",
    "useful for",
];

/// Build a catalog from documents already passed through
/// [`process_document`](super::swagger::process_document).
///
/// Documents whose titles map to the same category are merged. Categories are
/// sorted by name.
pub fn map_documents(documents: &[SwaggerDocument]) -> ApiCatalog {
    info!(count = documents.len(), "Mapping model documents to API catalog");

    let mut catalog = ApiCatalog::default();

    for doc in documents {
        debug!(file = %doc.source.display(), "Mapping model document");
        let swagger = &doc.document;
        let title = str_at(swagger, "/info/title").unwrap_or_default();
        let name = extract_category_name(title);

        let index = match catalog.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                let description = str_at(swagger, "/info/description")
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("APIs for {}", name));
                catalog.categories.push(ApiCategory::new(name.clone(), description));
                catalog.categories.len() - 1
            }
        };

        let endpoints = map_paths(swagger);
        catalog.categories[index].endpoints.extend(endpoints);
    }

    catalog.intent_mappings = generate_intent_mappings(&catalog.categories);
    catalog.categories.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    info!(
        categories = catalog.categories.len(),
        endpoints = catalog.total_endpoints(),
        "API catalog mapping complete"
    );
    catalog
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// "Selling Partner API for Orders" -> "Orders"; other titles are kept as-is.
pub fn extract_category_name(title: &str) -> String {
    let lower = title.to_ascii_lowercase();
    if let Some(start) = lower.find(TITLE_PREFIX) {
        let rest = title[start + TITLE_PREFIX.len()..].trim();
        if !rest.is_empty() {
            return rest.to_string();
        }
    }
    title.to_string()
}

/// camelCase category name used to prefix endpoint ids: "FBA Inventory" -> "fbaInventory".
pub fn category_prefix(title: &str) -> String {
    let cleaned: String = extract_category_name(title)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| if i == 0 { word.to_string() } else { capitalize(word) })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Operation id for operations that lack one: `GET /fba/inbound/{shipmentId}`
/// becomes `getFbaInboundShipmentid`.
pub fn generate_operation_id(path: &str, method: &str) -> String {
    let cleaned: String = path
        .strip_prefix('/')
        .unwrap_or(path)
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect();

    let camel: String = cleaned
        .split('/')
        .map(|part| capitalize(&part.to_lowercase()))
        .collect();

    format!("{}{}", method.to_lowercase(), camel)
}

fn map_paths(swagger: &Value) -> Vec<ApiEndpoint> {
    let Some(paths) = swagger.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();
    for (path, item) in paths {
        for method in HTTP_METHODS {
            if let Some(operation) = item.get(*method).filter(|op| op.is_object()) {
                endpoints.push(map_operation(path, &method.to_uppercase(), operation, swagger));
            }
        }
    }
    endpoints
}

fn map_operation(path: &str, method: &str, operation: &Value, swagger: &Value) -> ApiEndpoint {
    let original_operation_id = operation
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| generate_operation_id(path, method));
    let title = str_at(swagger, "/info/title").unwrap_or_default();
    let summary = text(operation, "summary");

    ApiEndpoint {
        id: format!("{}_{}", category_prefix(title), original_operation_id),
        name: if summary.is_empty() {
            original_operation_id.clone()
        } else {
            summary
        },
        path: path.to_string(),
        method: method.to_string(),
        description: text(operation, "description"),
        purpose: generate_purpose(operation, method),
        common_use_cases: generate_use_cases(operation, method, path),
        parameters: map_parameters(operation),
        responses: map_responses(operation),
        related_endpoints: find_related_endpoints(operation, path, method, swagger),
        version: VersionInfo {
            current: str_at(swagger, "/info/version").unwrap_or_default().to_string(),
            ..VersionInfo::default()
        },
        examples: extract_examples(operation),
        original_operation_id,
    }
}

/// Text up to and including the first `.`, `!` or `?`, when it is preceded by
/// at least one other character.
fn first_sentence(text: &str) -> Option<&str> {
    let end = text.find(|c: char| matches!(c, '.' | '!' | '?'))?;
    (end > 0).then(|| text[..=end].trim())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn generate_purpose(operation: &Value, method: &str) -> String {
    let description = text(operation, "description");
    if !description.is_empty() {
        if let Some(sentence) = first_sentence(&description) {
            return sentence.to_string();
        }
        if description.chars().count() > 100 {
            return format!("{}...", truncate_chars(&description, 97));
        }
        return description;
    }

    let summary = text(operation, "summary");
    if !summary.is_empty() {
        return summary;
    }

    match method {
        "GET" => "Retrieve information from Amazon SP-API.",
        "POST" => "Create or submit data to Amazon SP-API.",
        "PUT" => "Update existing data in Amazon SP-API.",
        "DELETE" => "Remove data from Amazon SP-API.",
        _ => "Interact with Amazon SP-API.",
    }
    .to_string()
}

fn generate_use_cases(operation: &Value, method: &str, path: &str) -> Vec<String> {
    let description = text(operation, "description").to_lowercase();
    let mut use_cases: Vec<String> = description
        .split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| USE_CASE_MARKERS.iter().any(|m| s.contains(m)))
        .map(|s| format!("{}.", capitalize(s)))
        .collect();

    if !use_cases.is_empty() {
        return use_cases;
    }

    let resource = extract_resource_from_path(path);
    let operation_id = text(operation, "operationId");
    match method {
        "GET" => {
            use_cases.push(format!("Retrieve {} information.", resource));
            if operation_id.contains("list") || operation_id.contains("search") {
                use_cases.push(format!("Find specific {} that match certain criteria.", resource));
            }
        }
        "POST" => {
            use_cases.push(format!("Create new {} in Amazon's system.", resource));
            if operation_id.contains("submit") || operation_id.contains("send") {
                use_cases.push(format!("Submit {} data to Amazon for processing.", resource));
            }
        }
        "PUT" => use_cases.push(format!("Update existing {} information.", resource)),
        "DELETE" => use_cases.push(format!("Remove {} from Amazon's system.", resource)),
        _ => {}
    }
    use_cases
}

/// Last literal path segment, naively singularised: `/orders/v0/orders/{id}` -> "order".
pub fn extract_resource_from_path(path: &str) -> String {
    match path
        .split('/')
        .filter(|p| !p.is_empty() && !p.contains('{'))
        .last()
    {
        Some(last) if last.len() > 1 && last.ends_with('s') => last[..last.len() - 1].to_string(),
        Some(last) => last.to_string(),
        None => "resources".to_string(),
    }
}

fn type_name(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => Some(
            types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
        ),
        _ => None,
    }
}

fn map_parameters(operation: &Value) -> Vec<ApiParameter> {
    let mut parameters: Vec<ApiParameter> = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .map(|param| {
                    let schema = param.get("schema").cloned();
                    ApiParameter {
                        name: text(param, "name"),
                        location: ParameterLocation::parse(
                            param.get("in").and_then(Value::as_str).unwrap_or_default(),
                        ),
                        required: param.get("required").and_then(Value::as_bool).unwrap_or(false),
                        param_type: type_name(param.get("type"))
                            .or_else(|| type_name(param.pointer("/schema/type")))
                            .unwrap_or_else(|| "string".to_string()),
                        description: text(param, "description"),
                        purpose: parameter_purpose(param),
                        default: param
                            .get("default")
                            .or_else(|| param.pointer("/schema/default"))
                            .cloned(),
                        schema,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(body) = operation.get("requestBody") {
        if let Some(schema) = body.pointer("/content/application~1json/schema") {
            let description = text(body, "description");
            parameters.push(ApiParameter {
                name: "body".to_string(),
                location: ParameterLocation::Body,
                required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
                param_type: "object".to_string(),
                description: if description.is_empty() {
                    "Request body".to_string()
                } else {
                    description
                },
                purpose: "Contains the data to send in the request body".to_string(),
                schema: Some(schema.clone()),
                default: None,
            });
        }
    }

    parameters
}

fn parameter_purpose(param: &Value) -> String {
    let description = text(param, "description");
    if !description.is_empty() {
        return first_sentence(&description)
            .map(str::to_string)
            .unwrap_or_else(|| description.clone());
    }

    let name = text(param, "name");
    match param.get("in").and_then(Value::as_str).unwrap_or_default() {
        "path" => format!("Identifies the specific {} in the request path.", name),
        "query" => "Filters or customizes the request results.".to_string(),
        "header" => "Provides additional context for the request.".to_string(),
        "body" => "Contains the data to be processed.".to_string(),
        _ => format!("Specifies the {} for this operation.", name),
    }
}

fn map_responses(operation: &Value) -> Vec<ApiResponse> {
    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return Vec::new();
    };

    responses
        .iter()
        .map(|(code, response)| ApiResponse {
            status_code: code.parse().unwrap_or(0),
            description: text(response, "description"),
            schema: response
                .get("schema")
                .or_else(|| response.pointer("/content/application~1json/schema"))
                .cloned(),
            headers: map_response_headers(response),
        })
        .collect()
}

fn map_response_headers(response: &Value) -> BTreeMap<String, ResponseHeader> {
    response
        .get("headers")
        .and_then(Value::as_object)
        .map(|headers| {
            headers
                .iter()
                .map(|(name, header)| {
                    let header_type = type_name(header.get("type"))
                        .or_else(|| type_name(header.pointer("/schema/type")))
                        .unwrap_or_else(|| "string".to_string());
                    (
                        name.clone(),
                        ResponseHeader {
                            header_type,
                            description: text(header, "description"),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `/orders/{orderId}/items/{itemId}` -> `/orders/{id}/items/{id}`
fn resource_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn tags(operation: &Value) -> Vec<&str> {
    operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|t| t.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn find_related_endpoints(
    operation: &Value,
    path: &str,
    method: &str,
    swagger: &Value,
) -> Vec<RelatedEndpoint> {
    let Some(current_id) = operation.get("operationId").and_then(Value::as_str) else {
        return Vec::new();
    };
    let Some(paths) = swagger.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let current_tags = tags(operation);
    let current_resource = resource_path(path);
    let resource = extract_resource_from_path(&current_resource);
    let mut related = Vec::new();

    for (other_path, item) in paths {
        for other_method in ["get", "post", "put", "delete"] {
            let Some(other) = item.get(other_method) else {
                continue;
            };
            let Some(other_id) = other.get("operationId").and_then(Value::as_str) else {
                continue;
            };
            if other_id == current_id {
                continue;
            }

            let other_tags = tags(other);
            let shared: Vec<&str> = current_tags
                .iter()
                .copied()
                .filter(|t| other_tags.contains(t))
                .collect();
            let same_resource =
                !current_resource.is_empty() && current_resource == resource_path(other_path);

            if !same_resource && shared.is_empty() {
                continue;
            }

            let relationship = if same_resource {
                match (method, other_method) {
                    ("GET", "post") => format!("Create a new {}", resource),
                    ("GET", "put") => format!("Update the {} information", resource),
                    ("GET", "delete") => format!("Delete the {}", resource),
                    ("POST", "get") => format!("Retrieve the created {}", resource),
                    _ => format!("Another operation on the same {} resource", resource),
                }
            } else {
                format!("Related to the same functionality ({})", shared.join(", "))
            };

            related.push(RelatedEndpoint {
                id: other_id.to_string(),
                relationship,
            });
        }
    }

    related
}

fn extract_examples(operation: &Value) -> Vec<UsageExample> {
    let mut examples = Vec::new();

    if let Some(sandbox) = operation
        .pointer("/x-amzn-api-sandbox/static")
        .and_then(Value::as_array)
    {
        for example in sandbox {
            if let (Some(request), Some(response)) = (example.get("request"), example.get("response")) {
                examples.push(UsageExample {
                    scenario: format!("Example {}", examples.len() + 1),
                    request: request.clone(),
                    response: response.clone(),
                });
            }
        }
    }

    if let Some(named) = operation
        .pointer("/requestBody/content/application~1json/examples")
        .and_then(Value::as_object)
    {
        for (name, example) in named {
            if let Some(value) = example.get("value") {
                examples.push(UsageExample {
                    scenario: name.clone(),
                    request: value.clone(),
                    response: matching_response(operation),
                });
            }
        }
    }

    examples
}

fn matching_response(operation: &Value) -> Value {
    let success = operation
        .pointer("/responses/200")
        .or_else(|| operation.pointer("/responses/201"));

    success
        .and_then(|r| {
            r.get("schema")
                .or_else(|| r.pointer("/content/application~1json/schema"))
        })
        .map(|schema| json!({ "schema": schema }))
        .unwrap_or_else(|| json!({ "message": "Successful response" }))
}

/// "Returns orders." -> "I want to returns orders"
fn format_as_intent(text: &str) -> String {
    let trimmed = text.strip_suffix('.').unwrap_or(text).trim().to_lowercase();
    if trimmed.is_empty() {
        return String::new();
    }
    if ["i want to", "i need to", "i would like to"]
        .iter()
        .any(|p| trimmed.starts_with(p))
    {
        trimmed
    } else {
        format!("I want to {}", trimmed)
    }
}

fn push_unique(mappings: &mut Vec<IntentMapping>, intent: String, endpoint: &str, reason: String) {
    if intent.is_empty()
        || mappings
            .iter()
            .any(|m| m.intent.eq_ignore_ascii_case(&intent))
    {
        return;
    }
    mappings.push(IntentMapping {
        intent,
        primary_endpoint: endpoint.to_string(),
        reason,
    });
}

fn generate_intent_mappings(categories: &[ApiCategory]) -> Vec<IntentMapping> {
    let mut mappings = Vec::new();

    for category in categories {
        for endpoint in &category.endpoints {
            let primary = format_as_intent(&endpoint.purpose);
            mappings.push(IntentMapping {
                reason: format!("This endpoint directly addresses your intent to {}", primary),
                intent: primary,
                primary_endpoint: endpoint.id.clone(),
            });

            for use_case in &endpoint.common_use_cases {
                push_unique(
                    &mut mappings,
                    format_as_intent(use_case),
                    &endpoint.id,
                    "This endpoint is designed for this specific use case".to_string(),
                );
            }

            add_operation_intents(&mut mappings, endpoint, &category.name);
        }
    }

    mappings
}

fn add_operation_intents(mappings: &mut Vec<IntentMapping>, endpoint: &ApiEndpoint, category: &str) {
    let id = endpoint.id.to_lowercase();
    let resource = extract_resource_from_path(&endpoint.path);
    let has = |needles: &[&str]| needles.iter().any(|n| id.contains(n));

    if has(&["get", "list", "search"]) {
        push_unique(
            mappings,
            format!("I want to find {} in my {} account", resource, category),
            &endpoint.id,
            format!("This endpoint retrieves {} information", resource),
        );
    }
    if has(&["create", "add"]) {
        push_unique(
            mappings,
            format!("I want to add a new {} to my {} account", resource, category),
            &endpoint.id,
            format!("This endpoint creates new {} entries", resource),
        );
    }
    if has(&["update", "edit"]) {
        push_unique(
            mappings,
            format!("I want to update my {} information", resource),
            &endpoint.id,
            format!("This endpoint updates existing {} data", resource),
        );
    }
    if has(&["delete", "remove"]) {
        push_unique(
            mappings,
            format!("I want to remove a {} from my account", resource),
            &endpoint.id,
            format!("This endpoint deletes {} entries", resource),
        );
    }
    if category.contains("Inventory") && has(&["inventory", "stock"]) {
        push_unique(
            mappings,
            "I want to check my current inventory levels".to_string(),
            &endpoint.id,
            "This endpoint provides information about your inventory".to_string(),
        );
    }
    if category.contains("Orders") && has(&["order"]) {
        push_unique(
            mappings,
            "I want to manage my Amazon orders".to_string(),
            &endpoint.id,
            "This endpoint helps you work with orders".to_string(),
        );
    }
}
