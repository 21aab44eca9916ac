//! Authority constants and construction options
//!
//! The well-known authority hosts are a fixed allow-list: an authority on
//! one of these hosts is trusted without an instance discovery round-trip.

/// Host of the world-wide Azure Active Directory authority
pub const WORLD_WIDE_AUTHORITY: &str = "login.microsoftonline.com";

/// Endpoint used to confirm that an unknown authority host is legitimate
pub const INSTANCE_DISCOVERY_ENDPOINT: &str = "https://login.windows.net/common/discovery/instance";

/// Authority hosts that never require instance discovery
pub const WELL_KNOWN_AUTHORITY_HOSTS: &[&str] = &[
    "login.windows.net",
    "login.microsoftonline.com",
    "login.chinacloudapi.cn",
    "login-us.microsoftonline.com",
    "login.microsoftonline.de",
];

/// Returns `true` when `host` exactly matches a well-known authority host.
///
/// # Examples
///
/// ```
/// use adal::options::is_well_known_authority_host;
///
/// assert!(is_well_known_authority_host("login.windows.net"));
/// assert!(!is_well_known_authority_host("login.contoso.com"));
/// ```
pub fn is_well_known_authority_host(host: &str) -> bool {
    WELL_KNOWN_AUTHORITY_HOSTS.contains(&host)
}

/// Options consumed when an [`AuthenticationContext`](crate::AuthenticationContext)
/// builds its authority.
///
/// Defaults: the world-wide authority host, no authority validation, and the
/// public instance discovery endpoint.
///
/// # Examples
///
/// ```
/// use adal::options::AuthenticationOptions;
///
/// let options = AuthenticationOptions::default()
///     .with_authority_host("login.chinacloudapi.cn")
///     .with_validate_authority(true);
///
/// assert_eq!(options.authority_host, "login.chinacloudapi.cn");
/// assert!(options.validate_authority);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationOptions {
    /// Host used when composing an authority URL from a tenant name
    pub authority_host: String,

    /// Whether the authority must be validated before it is trusted
    pub validate_authority: bool,

    /// Instance discovery endpoint queried for hosts outside the allow-list
    pub instance_discovery_endpoint: String,
}

impl Default for AuthenticationOptions {
    fn default() -> Self {
        Self {
            authority_host: WORLD_WIDE_AUTHORITY.to_string(),
            validate_authority: false,
            instance_discovery_endpoint: INSTANCE_DISCOVERY_ENDPOINT.to_string(),
        }
    }
}

impl AuthenticationOptions {
    /// Sets the authority host.
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Enables or disables authority validation.
    pub fn with_validate_authority(mut self, validate_authority: bool) -> Self {
        self.validate_authority = validate_authority;
        self
    }

    /// Overrides the instance discovery endpoint.
    pub fn with_instance_discovery_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.instance_discovery_endpoint = endpoint.into();
        self
    }
}
