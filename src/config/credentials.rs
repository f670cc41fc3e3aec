use anyhow::{anyhow, Result};
use std::fmt;

use super::{SpApiConfig, DEFAULT_BASE_URL, DEFAULT_OAUTH_URL};

/// LWA application credentials plus the endpoints they are used against.
#[derive(Clone)]
pub struct SpApiCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub base_url: String,
    pub oauth_url: String,
}

// Secrets never reach log output through `{:?}`.
impl fmt::Debug for SpApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpApiCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("oauth_url", &self.oauth_url)
            .finish()
    }
}

impl SpApiCredentials {
    /// Read `SP_API_*` environment variables.
    ///
    /// `SP_API_CLIENT_ID`, `SP_API_CLIENT_SECRET` and `SP_API_REFRESH_TOKEN` are
    /// required; `SP_API_BASE_URL` and `SP_API_OAUTH_URL` fall back to the
    /// North America and LWA defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), but endpoints missing from the
    /// environment come from the `[sp_api]` config section.
    pub fn from_env_or(sp_api: &SpApiConfig) -> Result<Self> {
        Self::from_vars_or(
            |key| std::env::var(key).ok(),
            &sp_api.base_url,
            &sp_api.oauth_url,
        )
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_vars_or(lookup, DEFAULT_BASE_URL, DEFAULT_OAUTH_URL)
    }

    fn from_vars_or<F>(lookup: F, base_url: &str, oauth_url: &str) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id = get("SP_API_CLIENT_ID");
        let client_secret = get("SP_API_CLIENT_SECRET");
        let refresh_token = get("SP_API_REFRESH_TOKEN");

        let missing: Vec<&str> = [
            ("SP_API_CLIENT_ID", client_id.is_none()),
            ("SP_API_CLIENT_SECRET", client_secret.is_none()),
            ("SP_API_REFRESH_TOKEN", refresh_token.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();

        match (client_id, client_secret, refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Self {
                client_id,
                client_secret,
                refresh_token,
                base_url: get("SP_API_BASE_URL").unwrap_or_else(|| base_url.to_string()),
                oauth_url: get("SP_API_OAUTH_URL").unwrap_or_else(|| oauth_url.to_string()),
            }),
            _ => Err(anyhow!(
                "Missing required SP-API credentials in environment variables: {}",
                missing.join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_required_and_defaults() {
        let creds = SpApiCredentials::from_vars(lookup(&[
            ("SP_API_CLIENT_ID", "amzn1.application-oa2-client.abc"),
            ("SP_API_CLIENT_SECRET", "shh"),
            ("SP_API_REFRESH_TOKEN", "Atzr|refresh"),
        ]))
        .unwrap();

        assert_eq!(creds.client_id, "amzn1.application-oa2-client.abc");
        assert_eq!(creds.base_url, DEFAULT_BASE_URL);
        assert_eq!(creds.oauth_url, DEFAULT_OAUTH_URL);
    }

    #[test]
    fn custom_urls_override_defaults() {
        let creds = SpApiCredentials::from_vars(lookup(&[
            ("SP_API_CLIENT_ID", "id"),
            ("SP_API_CLIENT_SECRET", "secret"),
            ("SP_API_REFRESH_TOKEN", "refresh"),
            ("SP_API_BASE_URL", "http://localhost:8000"),
            ("SP_API_OAUTH_URL", "http://localhost:8000/auth/o2/token"),
        ]))
        .unwrap();

        assert_eq!(creds.base_url, "http://localhost:8000");
        assert_eq!(creds.oauth_url, "http://localhost:8000/auth/o2/token");
    }

    #[test]
    fn config_endpoints_fill_gaps() {
        let creds = SpApiCredentials::from_vars_or(
            lookup(&[
                ("SP_API_CLIENT_ID", "id"),
                ("SP_API_CLIENT_SECRET", "secret"),
                ("SP_API_REFRESH_TOKEN", "refresh"),
                ("SP_API_OAUTH_URL", "http://localhost:9000/token"),
            ]),
            "https://sellingpartnerapi-eu.amazon.com",
            DEFAULT_OAUTH_URL,
        )
        .unwrap();

        assert_eq!(creds.base_url, "https://sellingpartnerapi-eu.amazon.com");
        assert_eq!(creds.oauth_url, "http://localhost:9000/token");
    }

    #[test]
    fn missing_values_are_listed() {
        let err = SpApiCredentials::from_vars(lookup(&[
            ("SP_API_CLIENT_ID", "id"),
            ("SP_API_REFRESH_TOKEN", "  "),
        ]))
        .unwrap_err()
        .to_string();

        assert!(err.contains("SP_API_CLIENT_SECRET"));
        assert!(err.contains("SP_API_REFRESH_TOKEN"));
        assert!(!err.contains("SP_API_CLIENT_ID,"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = SpApiCredentials::from_vars(lookup(&[
            ("SP_API_CLIENT_ID", "id"),
            ("SP_API_CLIENT_SECRET", "top-secret"),
            ("SP_API_REFRESH_TOKEN", "Atzr|refresh"),
        ]))
        .unwrap();

        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("Atzr|refresh"));
    }
}
