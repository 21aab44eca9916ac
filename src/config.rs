//! Configuration management for ADAL
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AdalError, Result};
use crate::options::{AuthenticationOptions, INSTANCE_DISCOVERY_ENDPOINT, WORLD_WIDE_AUTHORITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for ADAL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Authority resolution and validation settings
    #[serde(default)]
    pub authority: AuthorityConfig,
    /// Client credentials used by the `token` command
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Host used when composing an authority URL from a tenant name
    #[serde(default = "default_authority_host")]
    pub host: String,

    /// Validate the authority before trusting it
    #[serde(default)]
    pub validate: bool,

    /// Instance discovery endpoint for hosts outside the well-known list
    #[serde(default = "default_instance_discovery_endpoint")]
    pub instance_discovery_endpoint: String,

    /// Default tenant when none is given on the command line
    #[serde(default)]
    pub tenant: Option<String>,
}

fn default_authority_host() -> String {
    WORLD_WIDE_AUTHORITY.to_string()
}

fn default_instance_discovery_endpoint() -> String {
    INSTANCE_DISCOVERY_ENDPOINT.to_string()
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            host: default_authority_host(),
            validate: false,
            instance_discovery_endpoint: default_instance_discovery_endpoint(),
            tenant: None,
        }
    }
}

/// Client credentials configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Resource the token is requested for
    #[serde(default)]
    pub resource: Option<String>,

    /// Application (client) ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// Application secret
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("resource", &self.resource)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for discovery and token requests (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdalError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AdalError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("ADAL_AUTHORITY_HOST") {
            self.authority.host = host;
        }

        if let Ok(validate) = std::env::var("ADAL_VALIDATE_AUTHORITY") {
            match validate.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.authority.validate = true,
                "0" | "false" | "no" => self.authority.validate = false,
                _ => tracing::warn!("Invalid ADAL_VALIDATE_AUTHORITY: {}", validate),
            }
        }

        if let Ok(endpoint) = std::env::var("ADAL_INSTANCE_DISCOVERY_ENDPOINT") {
            self.authority.instance_discovery_endpoint = endpoint;
        }

        if let Ok(tenant) = std::env::var("ADAL_TENANT") {
            self.authority.tenant = Some(tenant);
        }

        if let Ok(resource) = std::env::var("ADAL_RESOURCE") {
            self.credentials.resource = Some(resource);
        }

        if let Ok(client_id) = std::env::var("ADAL_CLIENT_ID") {
            self.credentials.client_id = Some(client_id);
        }

        if let Ok(client_secret) = std::env::var("ADAL_CLIENT_SECRET") {
            self.credentials.client_secret = Some(client_secret);
        }

        if let Ok(timeout) = std::env::var("ADAL_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.http.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ADAL_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(host) = &cli.authority_host {
            self.authority.host = host.clone();
        }

        if cli.validate_authority {
            self.authority.validate = true;
        }

        if let Some(timeout) = cli.timeout_seconds {
            self.http.timeout_seconds = timeout;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.authority.host.is_empty() {
            return Err(AdalError::Config("authority.host cannot be empty".to_string()).into());
        }

        if url::Url::parse(&self.authority.instance_discovery_endpoint).is_err() {
            return Err(AdalError::Config(format!(
                "authority.instance_discovery_endpoint is not a valid URL: {}",
                self.authority.instance_discovery_endpoint
            ))
            .into());
        }

        if self.http.timeout_seconds == 0 {
            return Err(
                AdalError::Config("http.timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.http.timeout_seconds > 600 {
            return Err(AdalError::Config(
                "http.timeout_seconds must be less than or equal to 600".to_string(),
            )
            .into());
        }

        Ok(())
    }

    /// Authority options described by this configuration.
    pub fn authentication_options(&self) -> AuthenticationOptions {
        AuthenticationOptions::default()
            .with_authority_host(self.authority.host.clone())
            .with_validate_authority(self.authority.validate)
            .with_instance_discovery_endpoint(self.authority.instance_discovery_endpoint.clone())
    }

    /// Builds the HTTP client used for discovery and token requests.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be constructed.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "ADAL_AUTHORITY_HOST",
        "ADAL_VALIDATE_AUTHORITY",
        "ADAL_INSTANCE_DISCOVERY_ENDPOINT",
        "ADAL_TENANT",
        "ADAL_RESOURCE",
        "ADAL_CLIENT_ID",
        "ADAL_CLIENT_SECRET",
        "ADAL_TIMEOUT_SECONDS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.authority.host, "login.microsoftonline.com");
        assert!(!config.authority.validate);
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.credentials.client_id.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_host() {
        let mut config = Config::default();
        config.authority.host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_discovery_endpoint() {
        let mut config = Config::default();
        config.authority.instance_discovery_endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_timeout_bounds() {
        let mut config = Config::default();
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.http.timeout_seconds = 601;
        assert!(config.validate().is_err());

        config.http.timeout_seconds = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
authority:
  host: login.chinacloudapi.cn
  validate: true
  tenant: contoso
credentials:
  resource: https://management.chinacloudapi.cn/
  client_id: my-client
http:
  timeout_seconds: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.authority.host, "login.chinacloudapi.cn");
        assert!(config.authority.validate);
        assert_eq!(config.authority.tenant.as_deref(), Some("contoso"));
        assert_eq!(
            config.authority.instance_discovery_endpoint,
            INSTANCE_DISCOVERY_ENDPOINT
        );
        assert_eq!(config.credentials.client_id.as_deref(), Some("my-client"));
        assert!(config.credentials.client_secret.is_none());
        assert_eq!(config.http.timeout_seconds, 10);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.authority.host, WORLD_WIDE_AUTHORITY);
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_authentication_options_mapping() {
        let mut config = Config::default();
        config.authority.host = "login.microsoftonline.de".to_string();
        config.authority.validate = true;

        let options = config.authentication_options();
        assert_eq!(options.authority_host, "login.microsoftonline.de");
        assert!(options.validate_authority);
        assert_eq!(options.instance_discovery_endpoint, INSTANCE_DISCOVERY_ENDPOINT);
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = CredentialsConfig {
            resource: None,
            client_id: Some("id".to_string()),
            client_secret: Some("hunter2".to_string()),
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        clear_env();
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/adal.yaml", &cli).unwrap();
        assert_eq!(config.authority.host, WORLD_WIDE_AUTHORITY);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars() {
        clear_env();
        std::env::set_var("ADAL_AUTHORITY_HOST", "login-us.microsoftonline.com");
        std::env::set_var("ADAL_VALIDATE_AUTHORITY", "true");
        std::env::set_var("ADAL_CLIENT_SECRET", "s3cret");
        std::env::set_var("ADAL_TIMEOUT_SECONDS", "not-a-number");

        let mut config = Config::default();
        config.apply_env_vars();
        clear_env();

        assert_eq!(config.authority.host, "login-us.microsoftonline.com");
        assert!(config.authority.validate);
        assert_eq!(config.credentials.client_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        std::env::set_var("ADAL_AUTHORITY_HOST", "login.windows.net");

        let cli = crate::cli::Cli {
            authority_host: Some("login.microsoftonline.de".to_string()),
            validate_authority: true,
            timeout_seconds: Some(5),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("/nonexistent/adal.yaml", &cli).unwrap();
        clear_env();

        assert_eq!(config.authority.host, "login.microsoftonline.de");
        assert!(config.authority.validate);
        assert_eq!(config.http.timeout_seconds, 5);
    }
}
