//! Authentication context
//!
//! [`AuthenticationContext`] pairs one [`Authority`] with client credentials
//! exchanges against that authority's token endpoint.
//!
//! # Examples
//!
//! ```no_run
//! use adal::{AuthenticationContext, AuthenticationOptions};
//!
//! # async fn example() -> adal::Result<()> {
//! let context = AuthenticationContext::new(
//!     "contoso.onmicrosoft.com",
//!     AuthenticationOptions::default(),
//! )?;
//! let client = context.client(
//!     reqwest::Client::new(),
//!     "https://management.azure.com/",
//!     "client-id",
//!     "client-secret",
//! )?;
//!
//! let resp = client
//!     .get("https://management.azure.com/subscriptions?api-version=2020-01-01")
//!     .await?
//!     .send()
//!     .await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```

use anyhow::Context as _;

use crate::authority::Authority;
use crate::credentials::{AuthorizedClient, ClientCredentialsConfig, TokenSource};
use crate::error::{AdalError, Result};
use crate::options::AuthenticationOptions;

/// Form parameter carrying the target resource of a token request
const RESOURCE_PARAM: &str = "resource";

/// Facade over one authority and its client credentials exchanges.
#[derive(Debug)]
pub struct AuthenticationContext {
    authority: Authority,
}

impl AuthenticationContext {
    /// Creates a context for `tenant` on `options.authority_host`.
    ///
    /// The authority URL is `https://{authority_host}/{tenant}`.
    ///
    /// # Errors
    ///
    /// Returns [`AdalError::MissingParameter`] for an empty tenant, and the
    /// authority parse errors wrapped as `"authority create failed"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use adal::{AuthenticationContext, AuthenticationOptions};
    ///
    /// let context = AuthenticationContext::new(
    ///     "my.active-directory.localhost",
    ///     AuthenticationOptions::default(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(context.authority().host(), "login.microsoftonline.com");
    /// assert_eq!(context.authority().tenant(), "my.active-directory.localhost");
    /// ```
    pub fn new(tenant: &str, options: AuthenticationOptions) -> Result<Self> {
        if tenant.is_empty() {
            return Err(AdalError::MissingParameter("tenant".to_string()).into());
        }

        let authority_url = format!("https://{}/{}", options.authority_host, tenant);
        Self::from_authority_url(&authority_url, options)
    }

    /// Creates a context from a literal authority URL.
    ///
    /// `options.authority_host` is not used.
    ///
    /// # Errors
    ///
    /// Returns the authority parse errors wrapped as
    /// `"authority create failed"`.
    pub fn from_authority_url(
        authority_url: &str,
        options: AuthenticationOptions,
    ) -> Result<Self> {
        let authority = Authority::with_discovery_endpoint(
            authority_url,
            options.validate_authority,
            &options.instance_discovery_endpoint,
        )
        .context("authority create failed")?;

        Ok(Self { authority })
    }

    /// The authority of this context.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Validates the authority, see [`Authority::validate`].
    ///
    /// # Errors
    ///
    /// Returns the validation error wrapped as
    /// `"authority validation failed"`.
    pub async fn validate_authority(&self, http: &reqwest::Client) -> Result<()> {
        self.authority
            .validate(http)
            .await
            .context("authority validation failed")
    }

    /// Builds the client credentials exchange for `resource` against this
    /// context's token endpoint.
    ///
    /// Arguments are checked eagerly in the order resource, client ID,
    /// client secret.
    ///
    /// # Errors
    ///
    /// Returns [`AdalError::MissingParameter`] naming the first empty
    /// argument.
    pub fn client_credentials_config(
        &self,
        resource: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<ClientCredentialsConfig> {
        for (name, value) in [
            ("resource", resource),
            ("clientID", client_id),
            ("clientSecret", client_secret),
        ] {
            if value.is_empty() {
                return Err(AdalError::MissingParameter(name.to_string()).into());
            }
        }

        Ok(
            ClientCredentialsConfig::new(client_id, client_secret, self.authority.token_endpoint())
                .with_endpoint_param(RESOURCE_PARAM, resource),
        )
    }

    /// Returns a token source for `resource`.
    ///
    /// # Errors
    ///
    /// See [`client_credentials_config`](Self::client_credentials_config).
    pub fn token_source(
        &self,
        http: reqwest::Client,
        resource: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenSource> {
        let config = self.client_credentials_config(resource, client_id, client_secret)?;
        Ok(config.token_source(http))
    }

    /// Returns an HTTP client that authorizes its requests for `resource`.
    ///
    /// # Errors
    ///
    /// See [`client_credentials_config`](Self::client_credentials_config).
    pub fn client(
        &self,
        http: reqwest::Client,
        resource: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AuthorizedClient> {
        let config = self.client_credentials_config(resource, client_id, client_secret)?;
        Ok(config.client(http))
    }
}
