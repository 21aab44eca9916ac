//! Client credentials integration tests using wiremock
//!
//! Verifies the behaviour of `src/credentials.rs` and the token wiring in
//! `src/context.rs`:
//!
//! - The token request is a form POST carrying the grant type, client
//!   credentials and the `resource` parameter.
//! - `TokenSource` reuses a valid token and refreshes an expiring one.
//! - `AuthorizedClient` attaches the bearer token to outgoing requests.
//! - Token endpoint failures surface as typed errors.

mod common;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adal::credentials::{ClientCredentialsConfig, TokenProvider};
use adal::{AdalError, AuthenticationContext, AuthenticationOptions};
use common::token_body;

const TOKEN_PATH: &str = "/contoso/oauth2/token";

/// Builds the context's exchange configuration, pointed at the mock server.
fn mock_config(server: &MockServer) -> ClientCredentialsConfig {
    let context =
        AuthenticationContext::new("contoso", AuthenticationOptions::default()).unwrap();
    let mut config = context
        .client_credentials_config("https://vault.azure.net", "my-client", "my-secret")
        .unwrap();
    assert_eq!(
        config.token_url,
        "https://login.microsoftonline.com/contoso/oauth2/token"
    );
    config.token_url = format!("{}{}", server.uri(), TOKEN_PATH);
    config
}

#[tokio::test]
async fn test_token_request_form_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("client_secret=my-secret"))
        .and(body_string_contains("resource=https%3A%2F%2Fvault.azure.net"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let token = config.token(&reqwest::Client::new()).await.unwrap();

    assert_eq!(token.access_token, "token-1");
    assert_eq!(token.token_type, "Bearer");
    assert!(token.expires_at.is_some());
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_scopes_are_space_joined() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("scope=a+b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("scoped", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let config = mock_config(&server).with_scopes(vec!["a".to_string(), "b".to_string()]);
    let token = config.token(&reqwest::Client::new()).await.unwrap();
    assert_eq!(token.access_token, "scoped");
}

#[tokio::test]
async fn test_token_source_reuses_valid_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let source = mock_config(&server).token_source(reqwest::Client::new());

    let first = source.token().await.unwrap();
    let second = source.token().await.unwrap();
    assert_eq!(first.access_token, "token-1");
    assert_eq!(second.access_token, "token-1");
}

#[tokio::test]
async fn test_token_source_refreshes_expiring_token() {
    let server = MockServer::start().await;

    // Lifetime inside the expiry skew: every call needs a new token.
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short-lived", 30)))
        .expect(2)
        .mount(&server)
        .await;

    let source = mock_config(&server).token_source(reqwest::Client::new());

    source.token().await.unwrap();
    source.token().await.unwrap();
}

#[tokio::test]
async fn test_token_source_shares_one_refresh_across_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let source = std::sync::Arc::new(mock_config(&server).token_source(reqwest::Client::new()));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let source = std::sync::Arc::clone(&source);
        handles.push(tokio::spawn(async move { source.token().await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().access_token, "token-1");
    }
}

#[tokio::test]
async fn test_token_endpoint_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let err = config.token(&reqwest::Client::new()).await.unwrap_err();

    match err.downcast_ref::<AdalError>() {
        Some(AdalError::TokenRequestFailed { status, body }) => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("expected TokenRequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_token_endpoint_invalid_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;

    let config = mock_config(&server);
    let err = config.token(&reqwest::Client::new()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AdalError>(),
        Some(AdalError::TokenResponseInvalid(_))
    ));
}

#[tokio::test]
async fn test_authorized_client_attaches_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/secrets/db"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&server)
        .await;

    let client = mock_config(&server).client(reqwest::Client::new());
    let url = format!("{}/secrets/db", server.uri());

    for _ in 0..2 {
        let resp = client.get(&url).await.unwrap().send().await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}

#[tokio::test]
async fn test_authorized_client_capitalizes_lowercase_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "token-lc",
            "token_type": "bearer",
            "expires_in": "3600"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/secrets/db"))
        .and(header("authorization", "Bearer token-lc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_config(&server).client(reqwest::Client::new());
    let resp = client
        .get(format!("{}/secrets/db", server.uri()))
        .await
        .unwrap()
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_authorized_client_propagates_token_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = mock_config(&server).client(reqwest::Client::new());
    let result = client.post(format!("{}/anything", server.uri())).await;
    assert!(result.is_err());
}
