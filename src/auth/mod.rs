//! SP-API request authorization.
//!
//! Every SP-API call carries an LWA access token in `x-amz-access-token`.
//! Tokens are refreshed lazily and cached until shortly before they expire.

mod token;

pub use token::{refresh_access_token, AccessToken, EXPIRY_MARGIN_SECONDS};

use crate::config::SpApiCredentials;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[cfg(test)]
mod tests;

pub const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";

const REDACTED: &str = "[REDACTED]";

pub struct SpApiAuthenticator {
    credentials: SpApiCredentials,
    http_client: Client,
    cached: Mutex<Option<AccessToken>>,
}

impl SpApiAuthenticator {
    pub fn new(credentials: SpApiCredentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    pub fn with_client(credentials: SpApiCredentials, http_client: Client) -> Self {
        Self {
            credentials,
            http_client,
            cached: Mutex::new(None),
        }
    }

    /// Base URL requests are sent to (configured or the North America default).
    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    /// Return a valid access token, refreshing when the cached one has expired.
    ///
    /// A failed refresh leaves the cache empty so the next call retries.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid_at(Utc::now()) {
                return Ok(token.token.clone());
            }
        }

        info!("Refreshing SP-API access token");
        match refresh_access_token(&self.http_client, &self.credentials).await {
            Ok(token) => {
                info!(expires_at = %token.expires_at, "Refreshed SP-API access token");
                let value = token.token.clone();
                *cached = Some(token);
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh SP-API access token");
                *cached = None;
                Err(e).context("Failed to authenticate with SP-API")
            }
        }
    }

    /// Add the access token header, replacing any caller-supplied value.
    pub async fn authorize(&self, headers: &mut Vec<(String, String)>) -> Result<()> {
        let token = self.access_token().await?;
        headers.retain(|(name, _)| !name.eq_ignore_ascii_case(ACCESS_TOKEN_HEADER));
        headers.push((ACCESS_TOKEN_HEADER.to_string(), token));
        Ok(())
    }
}

/// True for header names that may carry credentials.
pub fn is_sensitive_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("token") || lower.contains("auth")
}

/// Copy of `headers` safe to log.
pub fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            if is_sensitive_header(name) {
                (name.clone(), REDACTED.to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}
