use anyhow::{Context, Result};
use spapi_toolkit::auth::SpApiAuthenticator;
use spapi_toolkit::catalog::CatalogLoader;
use spapi_toolkit::config::{self, SpApiCredentials};
use spapi_toolkit::mcp::{run_stdio_server, McpHandler};
use spapi_toolkit::tools::{ExecuteApiTool, ExploreCatalogTool};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spapi_toolkit=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("SP-API MCP server starting...");

    let config = config::load_from_env().context("Failed to load configuration")?;

    // Fail fast when credentials are missing
    let credentials = SpApiCredentials::from_env_or(&config.sp_api)?;
    info!(
        base_url = %credentials.base_url,
        oauth_url = %credentials.oauth_url,
        "SP-API credentials loaded"
    );

    let mut loader = CatalogLoader::new(config.catalog.path.clone());
    let catalog = loader.load().context("Failed to load SP-API catalog")?;

    let authenticator = Arc::new(SpApiAuthenticator::new(credentials));
    let execute_tool = ExecuteApiTool::new(Arc::clone(&catalog), authenticator)
        .with_user_agent(config.sp_api.user_agent.clone());
    let explore_tool =
        ExploreCatalogTool::new(catalog).with_max_tokens(config.catalog.max_tokens);

    let handler = McpHandler::new(execute_tool, explore_tool);
    run_stdio_server(&handler).await
}
