//! LWA token refresh.
//!
//! Exchanges the long-lived refresh token for a short-lived access token.

use crate::config::SpApiCredentials;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Seconds shaved off `expires_in` so a token is never used right at its edge.
pub const EXPIRY_MARGIN_SECONDS: i64 = 300;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// LWA token response
#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Bearer token held in process memory.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Refresh the access token against the LWA endpoint in `credentials.oauth_url`.
///
/// # Returns
/// * `Ok(AccessToken)` - Token with expiry already reduced by the safety margin
/// * `Err` - Non-2xx status (with body text), unparseable or empty token response
pub async fn refresh_access_token(
    client: &Client,
    credentials: &SpApiCredentials,
) -> Result<AccessToken> {
    let form = RefreshRequest {
        grant_type: "refresh_token",
        refresh_token: &credentials.refresh_token,
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
    };

    tracing::debug!(oauth_url = %credentials.oauth_url, "Refreshing SP-API access token");

    let response = client
        .post(&credentials.oauth_url)
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .context("Failed to send token refresh request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(anyhow!(
            "Token refresh failed with status {}: {}",
            status,
            body
        ));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    token_from_response(token_response, Utc::now())
}

pub(crate) fn token_from_response(
    response: TokenResponse,
    now: DateTime<Utc>,
) -> Result<AccessToken> {
    let token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("No access token received in the response"))?;

    let lifetime = (response.expires_in.unwrap_or(0) - EXPIRY_MARGIN_SECONDS).max(0);

    tracing::debug!(
        token_type = ?response.token_type,
        lifetime_seconds = lifetime,
        rotated_refresh_token = response.refresh_token.is_some(),
        "Token refresh successful"
    );

    Ok(AccessToken {
        token,
        expires_at: now + Duration::seconds(lifetime),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "access_token": "Atza|IwEBIA",
            "refresh_token": "Atzr|IwEBIB",
            "token_type": "bearer",
            "expires_in": 3600
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token.as_deref(), Some("Atza|IwEBIA"));
        assert_eq!(response.expires_in, Some(3600));
        assert_eq!(response.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_expiry_subtracts_margin() {
        let now = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expires_in": 3600}"#).unwrap();

        let token = token_from_response(response, now).unwrap();
        assert_eq!(token.expires_at, now + Duration::seconds(3300));
        assert!(token.is_valid_at(now));
        assert!(!token.is_valid_at(now + Duration::seconds(3300)));
    }

    #[test]
    fn test_short_lifetime_floors_at_zero() {
        let now = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expires_in": 60}"#).unwrap();

        let token = token_from_response(response, now).unwrap();
        assert_eq!(token.expires_at, now);
        assert!(!token.is_valid_at(now));
    }

    #[test]
    fn test_missing_access_token_is_error() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"token_type": "bearer", "expires_in": 3600}"#).unwrap();
        assert!(token_from_response(response, Utc::now()).is_err());

        let empty: TokenResponse = serde_json::from_str(r#"{"access_token": ""}"#).unwrap();
        assert!(token_from_response(empty, Utc::now()).is_err());
    }
}
