//! OAuth2 client credentials grant
//!
//! This module performs the `client_credentials` token exchange against an
//! authority's token endpoint and hands out bearer tokens:
//!
//! - [`ClientCredentialsConfig`] describes one exchange and can request a
//!   single token.
//! - [`TokenSource`] reuses its current token until it expires, then asks
//!   for a new one.
//! - [`AuthorizedClient`] attaches `Authorization: Bearer <token>` to every
//!   request it builds.
//!
//! Tokens live in memory only, for as long as their source lives.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{AdalError, Result};

/// Seconds before `expires_at` at which a token is treated as expired
const EXPIRY_SKEW_SECONDS: i64 = 60;

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// An access token issued by the token endpoint.
///
/// # Examples
///
/// ```
/// use adal::credentials::AccessToken;
///
/// let token = AccessToken {
///     access_token: "eyJ0eXAi".to_string(),
///     token_type: "Bearer".to_string(),
///     expires_at: None,
/// };
///
/// // A token with no expiry is never considered expired.
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token string.
    pub access_token: String,

    /// The token type, typically `"Bearer"`.
    pub token_type: String,

    /// UTC timestamp at which the token expires, when the server reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Returns `true` when the token is expired or expires within 60 seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use adal::credentials::AccessToken;
    /// use chrono::{Duration, Utc};
    ///
    /// let stale = AccessToken {
    ///     access_token: "tok".to_string(),
    ///     token_type: "Bearer".to_string(),
    ///     expires_at: Some(Utc::now() + Duration::seconds(30)),
    /// };
    /// assert!(stale.is_expired());
    /// ```
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                Utc::now() >= expires_at - chrono::Duration::seconds(EXPIRY_SKEW_SECONDS)
            }
        }
    }

    /// Value of the `Authorization` header for this token.
    ///
    /// Well-known token types are sent in their canonical case, so a
    /// `bearer` token type from the server becomes `Bearer`. An empty type
    /// is sent as `Bearer`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adal::credentials::AccessToken;
    ///
    /// let token = AccessToken {
    ///     access_token: "tok".to_string(),
    ///     token_type: "bearer".to_string(),
    ///     expires_at: None,
    /// };
    /// assert_eq!(token.authorization_header(), "Bearer tok");
    /// ```
    pub fn authorization_header(&self) -> String {
        let token_type = match self.token_type.as_str() {
            t if t.is_empty() || t.eq_ignore_ascii_case("bearer") => "Bearer",
            t if t.eq_ignore_ascii_case("mac") => "MAC",
            t if t.eq_ignore_ascii_case("basic") => "Basic",
            t => t,
        };
        format!("{} {}", token_type, self.access_token)
    }
}

/// `expires_in` is a number in OAuth2 but a numeric string in Azure AD v1.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(u64),
    Text(String),
}

impl Seconds {
    fn value(&self) -> Option<u64> {
        match self {
            Seconds::Number(n) => Some(*n),
            Seconds::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw JSON response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<Seconds>,
}

impl TokenResponse {
    fn into_access_token(self) -> AccessToken {
        let expires_at = self
            .expires_in
            .as_ref()
            .and_then(Seconds::value)
            .filter(|secs| *secs > 0)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        AccessToken {
            access_token: self.access_token,
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientCredentialsConfig
// ---------------------------------------------------------------------------

/// Parameters of one client credentials exchange.
///
/// # Examples
///
/// ```
/// use adal::credentials::ClientCredentialsConfig;
///
/// let config = ClientCredentialsConfig::new(
///     "client-id",
///     "client-secret",
///     "https://login.microsoftonline.com/contoso/oauth2/token",
/// )
/// .with_endpoint_param("resource", "https://management.azure.com/");
///
/// assert_eq!(config.endpoint_params["resource"], "https://management.azure.com/");
/// ```
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// Application (client) ID.
    pub client_id: String,

    /// Application secret.
    pub client_secret: String,

    /// Token endpoint URL.
    pub token_url: String,

    /// Optional scopes, sent space-separated when non-empty.
    pub scopes: Vec<String>,

    /// Extra form parameters sent with every token request, e.g. `resource`.
    pub endpoint_params: BTreeMap<String, String>,
}

impl std::fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("endpoint_params", &self.endpoint_params)
            .finish()
    }
}

impl ClientCredentialsConfig {
    /// Creates a configuration with no scopes and no extra parameters.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            scopes: Vec::new(),
            endpoint_params: BTreeMap::new(),
        }
    }

    /// Adds an extra token request parameter.
    pub fn with_endpoint_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.endpoint_params.insert(key.into(), value.into());
        self
    }

    /// Sets the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Requests a new token from the token endpoint.
    ///
    /// POSTs `grant_type=client_credentials` with the client ID, secret,
    /// scopes and extra parameters as a form body.
    ///
    /// # Errors
    ///
    /// - [`AdalError::TokenTransportFailure`] if the request cannot be sent.
    /// - [`AdalError::TokenRequestFailed`] on a non-2xx status.
    /// - [`AdalError::TokenResponseInvalid`] if the body is not a token
    ///   response.
    pub async fn token(&self, http: &reqwest::Client) -> Result<AccessToken> {
        let scope = self.scopes.join(" ");

        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if !scope.is_empty() {
            params.push(("scope", scope.as_str()));
        }
        for (key, value) in &self.endpoint_params {
            params.push((key.as_str(), value.as_str()));
        }

        tracing::debug!(
            "Requesting client credentials token from {} for client {}",
            self.token_url,
            self.client_id
        );

        let resp = http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AdalError::TokenTransportFailure(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AdalError::TokenRequestFailed { status, body }.into());
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| AdalError::TokenTransportFailure(e.to_string()))?;
        let raw: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| AdalError::TokenResponseInvalid(e.to_string()))?;

        if raw.access_token.is_empty() {
            return Err(
                AdalError::TokenResponseInvalid("access_token is empty".to_string()).into(),
            );
        }

        Ok(raw.into_access_token())
    }

    /// Creates a [`TokenSource`] for this configuration.
    pub fn token_source(self, http: reqwest::Client) -> TokenSource {
        TokenSource::new(http, self)
    }

    /// Creates an [`AuthorizedClient`] for this configuration.
    pub fn client(self, http: reqwest::Client) -> AuthorizedClient {
        let tokens = TokenSource::new(http.clone(), self);
        AuthorizedClient::new(http, tokens)
    }
}

// ---------------------------------------------------------------------------
// TokenProvider
// ---------------------------------------------------------------------------

/// Anything that can hand out a currently valid access token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token that is not expired.
    ///
    /// # Errors
    ///
    /// Returns error if a new token is needed and cannot be obtained.
    async fn token(&self) -> Result<AccessToken>;
}

// ---------------------------------------------------------------------------
// TokenSource
// ---------------------------------------------------------------------------

/// Token source backed by a client credentials exchange.
///
/// Holds the most recent token and returns it until it expires. Concurrent
/// callers wait on one refresh instead of each requesting a token.
pub struct TokenSource {
    http: reqwest::Client,
    config: ClientCredentialsConfig,
    current: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("config", &self.config)
            .finish()
    }
}

impl TokenSource {
    /// Creates a token source with no token yet.
    pub fn new(http: reqwest::Client, config: ClientCredentialsConfig) -> Self {
        Self {
            http,
            config,
            current: Mutex::new(None),
        }
    }

    /// The exchange configuration.
    pub fn config(&self) -> &ClientCredentialsConfig {
        &self.config
    }
}

#[async_trait]
impl TokenProvider for TokenSource {
    async fn token(&self) -> Result<AccessToken> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref().filter(|token| !token.is_expired()) {
            return Ok(token.clone());
        }

        let token = self.config.token(&self.http).await?;
        *current = Some(token.clone());
        Ok(token)
    }
}

// ---------------------------------------------------------------------------
// AuthorizedClient
// ---------------------------------------------------------------------------

/// HTTP client that attaches a bearer token to each request it builds.
///
/// # Examples
///
/// ```no_run
/// use adal::credentials::ClientCredentialsConfig;
///
/// # async fn example() -> adal::Result<()> {
/// let client = ClientCredentialsConfig::new(
///     "client-id",
///     "client-secret",
///     "https://login.microsoftonline.com/contoso/oauth2/token",
/// )
/// .with_endpoint_param("resource", "https://management.azure.com/")
/// .client(reqwest::Client::new());
///
/// let resp = client
///     .get("https://management.azure.com/subscriptions?api-version=2020-01-01")
///     .await?
///     .send()
///     .await?;
/// println!("{}", resp.status());
/// # Ok(())
/// # }
/// ```
pub struct AuthorizedClient<P: TokenProvider = TokenSource> {
    http: reqwest::Client,
    tokens: P,
}

impl<P: TokenProvider> AuthorizedClient<P> {
    /// Wraps `http` so its requests carry tokens from `tokens`.
    pub fn new(http: reqwest::Client, tokens: P) -> Self {
        Self { http, tokens }
    }

    /// The token provider used by this client.
    pub fn token_provider(&self) -> &P {
        &self.tokens
    }

    /// Builds a request with the `Authorization` header set.
    ///
    /// # Errors
    ///
    /// Returns the token provider's error when no token can be obtained.
    pub async fn request<U: reqwest::IntoUrl>(
        &self,
        method: reqwest::Method,
        url: U,
    ) -> Result<reqwest::RequestBuilder> {
        let token = self.tokens.token().await?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, token.authorization_header()))
    }

    /// Builds an authorized `GET` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn get<U: reqwest::IntoUrl>(&self, url: U) -> Result<reqwest::RequestBuilder> {
        self.request(reqwest::Method::GET, url).await
    }

    /// Builds an authorized `POST` request.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn post<U: reqwest::IntoUrl>(&self, url: U) -> Result<reqwest::RequestBuilder> {
        self.request(reqwest::Method::POST, url).await
    }
}
