//! Line-delimited JSON-RPC loop over stdin/stdout.

use crate::mcp::handlers::McpHandler;
use crate::mcp::types::{McpError, McpRequest, McpResponse, RequestId};
use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Serve MCP on the process's stdio until stdin closes.
pub async fn run_stdio_server(handler: &McpHandler) -> Result<()> {
    info!("MCP stdio server started");
    serve(handler, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("MCP stdio server stopped (stdin closed)");
    Ok(())
}

/// Read one JSON-RPC message per line from `reader` and write responses to
/// `writer`, one per line, until EOF.
pub async fn serve<R, W>(handler: &McpHandler, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read MCP input")? {
        if line.trim().is_empty() {
            continue;
        }
        debug!(request = %line, "MCP request received");

        if let Some(response) = dispatch_line(handler, &line).await {
            write_response(&mut writer, &response).await?;
        }
    }

    Ok(())
}

async fn dispatch_line(handler: &McpHandler, line: &str) -> Option<McpResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Failed to parse JSON-RPC message");
            return Some(McpResponse::error(
                None,
                McpError::parse_error(format!("Invalid JSON: {}", e)),
            ));
        }
    };

    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

    match serde_json::from_value::<McpRequest>(value) {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            warn!(error = %e, "Invalid JSON-RPC request");
            Some(McpResponse::error(
                id,
                McpError::invalid_request(format!("Invalid request: {}", e)),
            ))
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &McpResponse) -> Result<()> {
    let json = serde_json::to_string(response).context("Failed to encode MCP response")?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await.context("Failed to flush MCP response")?;
    Ok(())
}
