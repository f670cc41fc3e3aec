use super::*;
use mockito::{Matcher, Server};

fn credentials(oauth_url: String) -> SpApiCredentials {
    SpApiCredentials {
        client_id: "amzn1.application-oa2-client.test".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "Atzr|refresh".to_string(),
        base_url: crate::config::DEFAULT_BASE_URL.to_string(),
        oauth_url,
    }
}

#[tokio::test]
async fn refresh_posts_form_and_returns_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/o2/token")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "Atzr|refresh".into()),
            Matcher::UrlEncoded(
                "client_id".into(),
                "amzn1.application-oa2-client.test".into(),
            ),
            Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "Atza|token", "token_type": "bearer", "expires_in": 3600}"#)
        .create_async()
        .await;

    let creds = credentials(format!("{}/auth/o2/token", server.url()));
    let token = refresh_access_token(&Client::new(), &creds).await.unwrap();

    assert_eq!(token.token, "Atza|token");
    assert!(token.is_valid_at(Utc::now()));
    mock.assert_async().await;
}

#[tokio::test]
async fn refresh_error_includes_status_and_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/o2/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_grant"}"#)
        .create_async()
        .await;

    let creds = credentials(format!("{}/auth/o2/token", server.url()));
    let err = refresh_access_token(&Client::new(), &creds)
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("400"));
    assert!(err.contains("invalid_grant"));
}

#[tokio::test]
async fn authenticator_caches_token_until_expiry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/o2/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "Atza|cached", "expires_in": 3600}"#)
        .expect(1)
        .create_async()
        .await;

    let auth = SpApiAuthenticator::new(credentials(format!("{}/auth/o2/token", server.url())));

    assert_eq!(auth.access_token().await.unwrap(), "Atza|cached");
    assert_eq!(auth.access_token().await.unwrap(), "Atza|cached");
    mock.assert_async().await;
}

#[tokio::test]
async fn authenticator_refreshes_tokens_inside_margin() {
    let mut server = Server::new_async().await;
    // 200s of lifetime is inside the five-minute margin, so every call refreshes.
    let mock = server
        .mock("POST", "/auth/o2/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "Atza|short", "expires_in": 200}"#)
        .expect(2)
        .create_async()
        .await;

    let auth = SpApiAuthenticator::new(credentials(format!("{}/auth/o2/token", server.url())));

    auth.access_token().await.unwrap();
    auth.access_token().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn authenticator_surfaces_refresh_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/o2/token")
        .with_status(401)
        .with_body("unauthorized_client")
        .create_async()
        .await;

    let auth = SpApiAuthenticator::new(credentials(format!("{}/auth/o2/token", server.url())));
    let err = auth.access_token().await.unwrap_err();

    assert!(err.to_string().contains("Failed to authenticate with SP-API"));
    assert!(format!("{:#}", err).contains("unauthorized_client"));
    assert!(auth.cached.lock().await.is_none());
}

#[tokio::test]
async fn authorize_replaces_existing_token_header() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/auth/o2/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "Atza|fresh", "expires_in": 3600}"#)
        .create_async()
        .await;

    let auth = SpApiAuthenticator::new(credentials(format!("{}/auth/o2/token", server.url())));
    let mut headers = vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("X-Amz-Access-Token".to_string(), "stale".to_string()),
    ];

    auth.authorize(&mut headers).await.unwrap();

    let tokens: Vec<_> = headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(ACCESS_TOKEN_HEADER))
        .collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].1, "Atza|fresh");
}

#[test]
fn redact_masks_token_and_auth_headers() {
    let headers = vec![
        ("x-amz-access-token".to_string(), "Atza|secret".to_string()),
        ("Authorization".to_string(), "Bearer abc".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];

    let redacted = redact_headers(&headers);
    assert_eq!(redacted[0].1, "[REDACTED]");
    assert_eq!(redacted[1].1, "[REDACTED]");
    assert_eq!(redacted[2].1, "application/json");
}
