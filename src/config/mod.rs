pub mod credentials;
pub use credentials::SpApiCredentials;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://sellingpartnerapi-na.amazon.com";
pub const DEFAULT_OAUTH_URL: &str = "https://api.amazon.com/auth/o2/token";
pub const DEFAULT_USER_AGENT: &str = "SP-API-MCP-Server/1.0.0";
pub const DEFAULT_MAX_TOKENS: usize = 25_000;

/// Complete toolkit configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolkitConfig {
    #[serde(default)]
    pub sp_api: SpApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub mock: MockConfig,
}

/// Outbound SP-API and LWA endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SpApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_oauth_url() -> String {
    DEFAULT_OAUTH_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for SpApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            oauth_url: default_oauth_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Catalog location and explorer output limits
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Directory scanned recursively for API model documents
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    /// Estimated-token ceiling for a single explorer response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog")
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Settings API storage and listener
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_db")]
    pub db_path: PathBuf,
    #[serde(default = "default_secret_name")]
    pub secret_name: String,
    #[serde(default = "default_settings_port")]
    pub port: u16,
}

fn default_settings_db() -> PathBuf {
    PathBuf::from("settings.db")
}

fn default_secret_name() -> String {
    "settings".to_string()
}

fn default_settings_port() -> u16 {
    3000
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            db_path: default_settings_db(),
            secret_name: default_secret_name(),
            port: default_settings_port(),
        }
    }
}

/// Mock fixture server
#[derive(Debug, Clone, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_mock_port")]
    pub port: u16,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
}

fn default_mock_port() -> u16 {
    8000
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("responses")
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            port: default_mock_port(),
            fixtures_dir: default_fixtures_dir(),
        }
    }
}

impl ToolkitConfig {
    /// Override file values with `SPAPI_*` environment variables.
    ///
    /// Unparseable numbers are ignored and the previous value kept.
    pub fn apply_env(mut self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok());
        self
    }

    fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SPAPI_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPAPI_MAX_TOKENS") {
            if let Ok(n) = v.parse::<usize>() {
                self.catalog.max_tokens = n;
            }
        }
        if let Some(v) = lookup("SPAPI_SETTINGS_DB") {
            self.settings.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("SPAPI_SETTINGS_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.settings.port = n;
            }
        }
        if let Some(v) = lookup("SPAPI_MOCK_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.mock.port = n;
            }
        }
        if let Some(v) = lookup("SPAPI_FIXTURES_DIR") {
            self.mock.fixtures_dir = PathBuf::from(v);
        }
    }
}

/// Load configuration from TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ToolkitConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ToolkitConfig =
        toml::from_str(&contents).context("Failed to parse config file")?;
    Ok(config)
}

/// Load `SPAPI_CONFIG` (or `spapi.toml` when present), then apply env overrides.
///
/// A missing default file is not an error; a missing explicit file is.
pub fn load_from_env() -> Result<ToolkitConfig> {
    let config = match std::env::var("SPAPI_CONFIG") {
        Ok(path) => load_config(path)?,
        Err(_) if Path::new("spapi.toml").exists() => load_config("spapi.toml")?,
        Err(_) => ToolkitConfig::default(),
    };
    Ok(config.apply_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ToolkitConfig::default();
        assert_eq!(config.sp_api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.sp_api.oauth_url, DEFAULT_OAUTH_URL);
        assert_eq!(config.catalog.max_tokens, 25_000);
        assert_eq!(config.settings.secret_name, "settings");
        assert_eq!(config.mock.port, 8000);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [sp_api]
            base_url = "http://localhost:8000"

            [catalog]
            path = "/opt/models"
            max_tokens = 1000

            [settings]
            db_path = "/tmp/settings.db"
            secret_name = "sp-api"
            port = 3100
        "#;

        let config: ToolkitConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.sp_api.base_url, "http://localhost:8000");
        assert_eq!(config.sp_api.oauth_url, DEFAULT_OAUTH_URL);
        assert_eq!(config.catalog.path, PathBuf::from("/opt/models"));
        assert_eq!(config.catalog.max_tokens, 1000);
        assert_eq!(config.settings.secret_name, "sp-api");
        assert_eq!(config.settings.port, 3100);
        assert_eq!(config.mock.fixtures_dir, PathBuf::from("responses"));
    }

    #[test]
    fn test_env_overrides_ignore_bad_numbers() {
        let vars: HashMap<&str, &str> = [
            ("SPAPI_CATALOG_PATH", "/srv/catalog"),
            ("SPAPI_MAX_TOKENS", "not-a-number"),
            ("SPAPI_MOCK_PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = ToolkitConfig::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.catalog.path, PathBuf::from("/srv/catalog"));
        assert_eq!(config.catalog.max_tokens, 25_000);
        assert_eq!(config.mock.port, 9000);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spapi.toml");
        std::fs::write(&path, "[mock]\nport = 8123\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.mock.port, 8123);
        assert!(load_config(dir.path().join("missing.toml")).is_err());
    }
}
