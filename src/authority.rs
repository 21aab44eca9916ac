//! Authority parsing, endpoint derivation and validation
//!
//! An authority is the identity provider root `https://{host}/{tenant}`.
//! The OAuth2 endpoints are pure functions of host and tenant and can be
//! used whether or not the authority has been validated.
//!
//! # Validation
//!
//! [`Authority::validate`] confirms the authority at most conceptually once:
//!
//! 1. An already validated authority returns immediately.
//! 2. A host on the well-known list is trusted without a network call.
//! 3. Any other host is checked with one instance discovery request.
//!
//! The validated flag is an [`AtomicBool`] that is only ever set to `true`.
//! Concurrent callers racing on an unvalidated authority may each issue a
//! discovery request; they all store the same final value.

use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::discovery;
use crate::error::{AdalError, Result};
use crate::options::{is_well_known_authority_host, INSTANCE_DISCOVERY_ENDPOINT};

/// Tenant name that identifies an ADFS authority
const ADFS_TENANT: &str = "adfs";

/// Result of parsing a raw authority string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthority {
    /// The parsed authority URL
    pub url: Url,
    /// Authority host, including an explicit non-default port
    pub host: String,
    /// First path segment of the URL
    pub tenant: String,
}

/// Parses and validates a raw authority string.
///
/// The input must be an absolute `https` URL without a query string whose
/// path has a non-empty first segment. That segment becomes the tenant.
///
/// # Errors
///
/// - [`AdalError::MalformedUrl`] if the input is not an absolute URL.
/// - [`AdalError::InvalidScheme`] if the scheme is not `https`, or is empty
///   as for a rooted path like `/contoso`.
/// - [`AdalError::UnexpectedQuery`] if the URL has a query string.
/// - [`AdalError::MissingTenant`] if the path has no first segment.
///
/// # Examples
///
/// ```
/// use adal::authority::parse_authority_url;
///
/// let parsed = parse_authority_url("https://login.microsoftonline.com/contoso").unwrap();
/// assert_eq!(parsed.host, "login.microsoftonline.com");
/// assert_eq!(parsed.tenant, "contoso");
///
/// assert!(parse_authority_url("http://login.microsoftonline.com/contoso").is_err());
/// ```
pub fn parse_authority_url(raw: &str) -> Result<ParsedAuthority> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        // A rooted path parses as a request URI with an empty scheme.
        Err(url::ParseError::RelativeUrlWithoutBase) if raw.starts_with('/') => {
            return Err(AdalError::InvalidScheme(raw.to_string()).into());
        }
        Err(e) => return Err(AdalError::MalformedUrl(format!("{raw}: {e}")).into()),
    };

    if url.scheme() != "https" {
        return Err(AdalError::InvalidScheme(raw.to_string()).into());
    }

    if url.query().is_some_and(|query| !query.is_empty()) {
        return Err(AdalError::UnexpectedQuery(raw.to_string()).into());
    }

    let hostname = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| AdalError::MalformedUrl(format!("{raw}: missing host")))?;
    let host = match url.port() {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.to_string(),
    };

    let tenant = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AdalError::MissingTenant(raw.to_string()))?;

    Ok(ParsedAuthority { url, host, tenant })
}

/// An identity provider authority.
///
/// # Examples
///
/// ```
/// use adal::Authority;
///
/// let authority = Authority::new("https://login.microsoftonline.com/contoso", false).unwrap();
///
/// assert!(authority.validated());
/// assert_eq!(
///     authority.token_endpoint(),
///     "https://login.microsoftonline.com/contoso/oauth2/token"
/// );
/// ```
#[derive(Debug)]
pub struct Authority {
    url: Url,
    host: String,
    tenant: String,
    validated: AtomicBool,
    discovery_endpoint: String,
}

impl Authority {
    /// Creates an authority from a URL.
    ///
    /// When `validate_authority` is `false` the authority is trusted from the
    /// start and [`validate`](Self::validate) never touches the network.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`parse_authority_url`].
    pub fn new(url: &str, validate_authority: bool) -> Result<Self> {
        Self::with_discovery_endpoint(url, validate_authority, INSTANCE_DISCOVERY_ENDPOINT)
    }

    /// Creates an authority that validates unknown hosts against
    /// `discovery_endpoint` instead of the public instance discovery endpoint.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`parse_authority_url`], and returns
    /// [`AdalError::MalformedUrl`] if `discovery_endpoint` is not an absolute
    /// URL.
    pub fn with_discovery_endpoint(
        url: &str,
        validate_authority: bool,
        discovery_endpoint: &str,
    ) -> Result<Self> {
        let parsed = parse_authority_url(url)?;

        Url::parse(discovery_endpoint).map_err(|e| {
            AdalError::MalformedUrl(format!(
                "invalid instance discovery endpoint {discovery_endpoint}: {e}"
            ))
        })?;

        Ok(Self {
            url: parsed.url,
            host: parsed.host,
            tenant: parsed.tenant,
            validated: AtomicBool::new(!validate_authority),
            discovery_endpoint: discovery_endpoint.to_string(),
        })
    }

    /// The parsed authority URL as given by the caller.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Authority host, e.g. `login.microsoftonline.com`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Tenant path segment.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Whether the authority is trusted.
    pub fn validated(&self) -> bool {
        self.validated.load(Ordering::Acquire)
    }

    fn base_url(&self) -> String {
        format!("https://{}/{}", self.host, self.tenant)
    }

    /// `https://{host}/{tenant}/oauth2/authorize`
    pub fn authorize_endpoint(&self) -> String {
        self.base_url() + "/oauth2/authorize"
    }

    /// `https://{host}/{tenant}/oauth2/token`
    pub fn token_endpoint(&self) -> String {
        self.base_url() + "/oauth2/token"
    }

    /// `https://{host}/{tenant}/oauth2/devicecode`
    pub fn device_code_endpoint(&self) -> String {
        self.base_url() + "/oauth2/devicecode"
    }

    /// Returns `true` when the tenant is `adfs`, ignoring case.
    pub fn is_adfs_authority(&self) -> bool {
        self.tenant.eq_ignore_ascii_case(ADFS_TENANT)
    }

    /// Validates the authority.
    ///
    /// Idempotent. Already validated authorities and well-known hosts return
    /// without a network call; any other host triggers exactly one instance
    /// discovery request. A failed validation leaves the authority
    /// unvalidated so the caller may retry.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client for the discovery request. Supply a client
    ///   with a timeout to bound the call.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`discovery::fetch_instance_discovery`].
    pub async fn validate(&self, http: &reqwest::Client) -> Result<()> {
        if self.validated() {
            tracing::debug!("Authority {} already validated", self.base_url());
            return Ok(());
        }

        let hostname = self.url.host_str().unwrap_or(&self.host);
        if is_well_known_authority_host(hostname) {
            tracing::debug!("Authority host {} is well known", hostname);
            self.mark_validated();
            return Ok(());
        }

        let authorize_endpoint = self.authorize_endpoint();
        let discovered =
            discovery::fetch_instance_discovery(http, &self.discovery_endpoint, &authorize_endpoint)
                .await;
        match discovered {
            Ok(tenant_discovery_endpoint) => {
                tracing::info!(
                    "Authority {} validated by instance discovery (tenant discovery endpoint: {})",
                    self.base_url(),
                    tenant_discovery_endpoint
                );
                self.mark_validated();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Instance discovery failed for {}: {}", self.base_url(), e);
                Err(e)
            }
        }
    }

    fn mark_validated(&self) {
        self.validated.store(true, Ordering::Release);
    }
}
