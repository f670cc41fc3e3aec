// Configuration and SP-API credentials
pub mod config;

// LWA token refresh and request signing headers
pub mod auth;

// Selling region endpoints
pub mod region;

// SP-API model catalog loading and lookup
pub mod catalog;

// MCP tools: request execution and catalog exploration
pub mod tools;

// MCP stdio server
pub mod mcp;

// Encrypted settings store
pub mod settings;

// HTTP APIs
pub mod api;

// Locale helpers
pub mod i18n;

// Non-failing JSON helpers
pub mod serialization;
