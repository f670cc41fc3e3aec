//! Model Context Protocol server exposing the SP-API tools.
//!
//! JSON-RPC 2.0 messages arrive one per line on stdin and responses are
//! written one per line to stdout, so all logging goes to stderr.

pub mod handlers;
pub mod server;
pub mod types;

pub use handlers::McpHandler;
pub use server::{run_stdio_server, serve};
pub use types::{McpError, McpRequest, McpResponse, RequestId};
