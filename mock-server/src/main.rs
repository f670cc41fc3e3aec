use anyhow::{Context, Result};
use spapi_mock_server::{create_mock_router, MockState};
use spapi_toolkit::config;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spapi_mock_server=info".into()),
        )
        .init();

    info!("SP-API mock server starting...");

    let config = config::load_from_env().context("Failed to load configuration")?;
    let mock = config.mock;

    if !mock.fixtures_dir.is_dir() {
        warn!(
            fixtures_dir = %mock.fixtures_dir.display(),
            "Fixtures directory not found; queued fixtures will fail with 500"
        );
    }

    let app = create_mock_router(MockState::new(mock.fixtures_dir.clone()));

    let addr = format!("0.0.0.0:{}", mock.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, fixtures_dir = %mock.fixtures_dir.display(), "Mock server listening");

    axum::serve(listener, app).await.context("Mock server failed")?;

    Ok(())
}
