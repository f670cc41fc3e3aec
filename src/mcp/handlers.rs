//! MCP method handlers: initialization, tool discovery and tool execution.

use crate::mcp::types::{McpError, McpRequest, McpResponse, JSONRPC_VERSION};
use crate::tools::{execute, explore, ExecuteApiTool, ExecuteParams, ExploreCatalogTool, ExploreParams};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

#[cfg(test)]
mod tests;

pub const SERVER_NAME: &str = "amazon-sp-api";
pub const SERVER_VERSION: &str = "0.1.0";

/// Newest first; unknown client versions are answered with the first entry.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Routes MCP requests to the SP-API tools.
pub struct McpHandler {
    execute_tool: ExecuteApiTool,
    explore_tool: ExploreCatalogTool,
}

impl McpHandler {
    pub fn new(execute_tool: ExecuteApiTool, explore_tool: ExploreCatalogTool) -> Self {
        Self {
            execute_tool,
            explore_tool,
        }
    }

    /// Handle one request. Notifications produce no response.
    pub async fn handle(&self, request: McpRequest) -> Option<McpResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            warn!(jsonrpc = %request.jsonrpc, "Rejecting request with wrong jsonrpc version");
            return request.id.map(|id| {
                McpResponse::error(
                    Some(id),
                    McpError::invalid_request(format!(
                        "Unsupported jsonrpc version: {}",
                        request.jsonrpc
                    )),
                )
            });
        }

        if request.is_notification() {
            debug!(method = %request.method, "MCP notification received");
            return None;
        }

        let result = match request.method.as_str() {
            "initialize" => handle_initialize(&request.params),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            other => {
                warn!(method = %other, "Unknown MCP method");
                Err(McpError::method_not_found(other))
            }
        };

        Some(match result {
            Ok(value) => McpResponse::success(request.id, value),
            Err(e) => {
                error!(method = %request.method, code = e.code, error = %e.message, "MCP request failed");
                McpResponse::error(request.id, e)
            }
        })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::invalid_params("Missing 'name' parameter"))?;
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        info!(tool = %name, "Calling tool");

        let text = match name {
            execute::TOOL_NAME => {
                let args: ExecuteParams = parse_arguments(arguments)?;
                self.execute_tool.execute(&args).await
            }
            explore::TOOL_NAME => {
                let args: ExploreParams = parse_arguments(arguments)?;
                self.explore_tool.execute(&args)
            }
            other => return Err(McpError::invalid_params(format!("Unknown tool: {}", other))),
        };

        Ok(json!({
            "content": [{"type": "text", "text": text}],
            "isError": false,
        }))
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::invalid_params(e.to_string()))
}

/// Echo the client's protocol version when supported, otherwise offer ours.
pub fn handle_initialize(params: &Value) -> Result<Value, McpError> {
    let requested = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::invalid_params("Missing protocolVersion parameter"))?;

    let version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&requested) {
        requested
    } else {
        warn!(requested = %requested, "Unsupported protocol version requested");
        SUPPORTED_PROTOCOL_VERSIONS[0]
    };

    info!(protocol_version = %version, "MCP session initialized");

    Ok(json!({
        "protocolVersion": version,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
        },
        "capabilities": {
            "tools": {"listChanged": false},
        },
    }))
}

pub fn handle_tools_list() -> Value {
    json!({
        "tools": [
            {
                "name": execute::TOOL_NAME,
                "description": execute::TOOL_DESCRIPTION,
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "endpoint": {
                            "type": "string",
                            "description": "The specific SP-API endpoint to use (required)"
                        },
                        "parameters": {
                            "type": "object",
                            "additionalProperties": {},
                            "description": "Complete set of API parameters"
                        },
                        "method": {
                            "type": "string",
                            "enum": ["GET", "POST", "PUT", "DELETE"],
                            "description": "HTTP method"
                        },
                        "additionalHeaders": {
                            "type": "object",
                            "additionalProperties": {"type": "string"},
                            "description": "Additional request headers"
                        },
                        "rawMode": {
                            "type": "boolean",
                            "default": false,
                            "description": "Return raw response if true"
                        },
                        "generateCode": {
                            "type": "boolean",
                            "default": false,
                            "description": "Generate code snippet if true"
                        },
                        "region": {
                            "type": "string",
                            "default": "us-east-1",
                            "description": "AWS region for the request"
                        }
                    },
                    "required": ["endpoint", "parameters"]
                }
            },
            {
                "name": explore::TOOL_NAME,
                "description": explore::TOOL_DESCRIPTION,
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "endpoint": {
                            "type": "string",
                            "description": "Specific endpoint to get details for"
                        },
                        "category": {
                            "type": "string",
                            "description": "Category to explore"
                        },
                        "listEndpoints": {
                            "type": "boolean",
                            "default": false,
                            "description": "List all available endpoints"
                        },
                        "listCategories": {
                            "type": "boolean",
                            "default": false,
                            "description": "List all available categories"
                        },
                        "depth": {
                            "anyOf": [{"type": "number"}, {"type": "string"}],
                            "default": "full",
                            "description": "Control nested object expansion depth. When NOT specified, defaults to 'full' (complete expansion). Must be either a number (0, 1, 2, 3, etc.) for specific depth levels, or the string 'full' for complete expansion. Omit this parameter entirely for full expansion; do NOT pass null."
                        },
                        "ref": {
                            "type": "string",
                            "description": "Extract specific nested object using dot notation (e.g., 'Order.ShippingAddress')"
                        }
                    }
                }
            }
        ]
    })
}
