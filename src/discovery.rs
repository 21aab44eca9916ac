//! Instance discovery for authorities outside the well-known host list
//!
//! An authority on an unknown host is confirmed by asking the instance
//! discovery endpoint about its authorize endpoint:
//!
//! ```text
//! GET <discovery endpoint>?authorization_endpoint=<authorize URL>&api-version=1.0
//! ```
//!
//! The endpoint answers with a JSON document; the authority is legitimate
//! when the response status is 2xx and `tenant_discovery_endpoint` is a
//! non-empty string. Every other field is ignored.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AdalError, Result};

/// API version sent with every instance discovery request
pub const INSTANCE_DISCOVERY_API_VERSION: &str = "1.0";

/// Instance discovery response document.
///
/// # Examples
///
/// ```
/// use adal::discovery::InstanceDiscoveryResponse;
///
/// let json = r#"{
///     "tenant_discovery_endpoint": "https://login.contoso.com/t/.well-known/openid-configuration",
///     "api-version": "1.1"
/// }"#;
///
/// let doc: InstanceDiscoveryResponse = serde_json::from_str(json).unwrap();
/// assert!(doc.tenant_discovery_endpoint.is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceDiscoveryResponse {
    /// OpenID configuration URL of the tenant, present when the authority is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_discovery_endpoint: Option<String>,
}

impl InstanceDiscoveryResponse {
    /// Returns the tenant discovery endpoint when it is present and non-empty.
    pub fn tenant_discovery_endpoint(&self) -> Option<&str> {
        self.tenant_discovery_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.is_empty())
    }
}

/// Builds the instance discovery request URL for an authorize endpoint.
///
/// Any query already present on `discovery_endpoint` is replaced.
///
/// # Errors
///
/// Returns [`AdalError::MalformedUrl`] if `discovery_endpoint` is not an
/// absolute URL.
///
/// # Examples
///
/// ```
/// use adal::discovery::build_instance_discovery_url;
///
/// let url = build_instance_discovery_url(
///     "https://login.windows.net/common/discovery/instance",
///     "https://login.contoso.com/tenant/oauth2/authorize",
/// )
/// .unwrap();
///
/// assert_eq!(
///     url.as_str(),
///     "https://login.windows.net/common/discovery/instance?authorization_endpoint=https%3A%2F%2Flogin.contoso.com%2Ftenant%2Foauth2%2Fauthorize&api-version=1.0"
/// );
/// ```
pub fn build_instance_discovery_url(
    discovery_endpoint: &str,
    authorize_endpoint: &str,
) -> Result<Url> {
    let mut url = Url::parse(discovery_endpoint).map_err(|e| {
        AdalError::MalformedUrl(format!(
            "invalid instance discovery endpoint {discovery_endpoint}: {e}"
        ))
    })?;

    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("authorization_endpoint", authorize_endpoint)
        .append_pair("api-version", INSTANCE_DISCOVERY_API_VERSION);

    Ok(url)
}

/// Performs one instance discovery round-trip for `authorize_endpoint`.
///
/// # Arguments
///
/// * `http` - HTTP client used for the request; any deadline is its own.
/// * `discovery_endpoint` - Instance discovery endpoint URL.
/// * `authorize_endpoint` - Authorize URL of the authority being validated.
///
/// # Returns
///
/// The tenant discovery endpoint reported for the authority.
///
/// # Errors
///
/// - [`AdalError::MalformedUrl`] if the discovery endpoint is not a URL.
/// - [`AdalError::DiscoveryTransportFailure`] if the request cannot be sent
///   or its body cannot be read.
/// - [`AdalError::DiscoveryRequestFailed`] on a non-2xx status.
/// - [`AdalError::DiscoveryResponseInvalid`] on malformed JSON or a missing
///   or empty `tenant_discovery_endpoint`.
pub async fn fetch_instance_discovery(
    http: &reqwest::Client,
    discovery_endpoint: &str,
    authorize_endpoint: &str,
) -> Result<String> {
    let url = build_instance_discovery_url(discovery_endpoint, authorize_endpoint)?;
    tracing::debug!("Requesting instance discovery: {}", url);

    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| AdalError::DiscoveryTransportFailure(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AdalError::DiscoveryRequestFailed {
            status: status.as_u16(),
        }
        .into());
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| AdalError::DiscoveryTransportFailure(e.to_string()))?;

    let doc: InstanceDiscoveryResponse = serde_json::from_slice(&body)
        .map_err(|e| AdalError::DiscoveryResponseInvalid(e.to_string()))?;

    doc.tenant_discovery_endpoint()
        .map(str::to_string)
        .ok_or_else(|| {
            AdalError::DiscoveryResponseInvalid(
                "tenant_discovery_endpoint missing or empty".to_string(),
            )
            .into()
        })
}
