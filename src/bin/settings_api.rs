use anyhow::{Context, Result};
use spapi_toolkit::api::{create_settings_router, SettingsAppState};
use spapi_toolkit::config;
use spapi_toolkit::settings::SettingsStore;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spapi_toolkit=info,settings_api=info".into()),
        )
        .init();

    info!("Settings API starting...");

    let config = config::load_from_env().context("Failed to load configuration")?;
    let settings = config.settings;

    let encryption_key = std::env::var("SPAPI_ENCRYPTION_KEY")
        .context("SPAPI_ENCRYPTION_KEY must be set (base64-encoded 32-byte key)")?;
    let store = SettingsStore::new(&settings.db_path, &encryption_key)
        .context("Failed to open settings store")?;
    info!(db_path = %settings.db_path.display(), "Settings store opened");

    let app = create_settings_router(SettingsAppState {
        store: Arc::new(store),
        secret_name: settings.secret_name,
    });

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Settings API listening");

    axum::serve(listener, app).await.context("Settings API server failed")?;

    Ok(())
}
