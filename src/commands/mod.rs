//! Command handlers for the CLI
//!
//! - `endpoints` -- print the endpoints derived from an authority
//! - `validate`  -- run authority validation and report the outcome
//! - `token`     -- acquire a client credentials token

use prettytable::{row, Table};
use serde::Serialize;

use crate::cli::AuthorityArgs;
use crate::config::Config;
use crate::context::AuthenticationContext;
use crate::credentials::TokenProvider;
use crate::error::{AdalError, Result};
use crate::options::AuthenticationOptions;

/// Summary of an authority as printed by the `endpoints` command.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointsReport {
    /// Authority host
    pub host: String,
    /// Tenant path segment
    pub tenant: String,
    /// Whether the tenant is `adfs`
    pub adfs: bool,
    /// Whether the authority is already trusted
    pub validated: bool,
    /// OAuth2 authorize endpoint
    pub authorize_endpoint: String,
    /// OAuth2 token endpoint
    pub token_endpoint: String,
    /// OAuth2 device code endpoint
    pub device_code_endpoint: String,
}

impl EndpointsReport {
    /// Builds the report for the authority of `context`.
    pub fn from_context(context: &AuthenticationContext) -> Self {
        let authority = context.authority();
        Self {
            host: authority.host().to_string(),
            tenant: authority.tenant().to_string(),
            adfs: authority.is_adfs_authority(),
            validated: authority.validated(),
            authorize_endpoint: authority.authorize_endpoint(),
            token_endpoint: authority.token_endpoint(),
            device_code_endpoint: authority.device_code_endpoint(),
        }
    }
}

/// Builds the authentication context selected by `args`.
///
/// A literal `--url` wins; otherwise the tenant comes from the command line
/// or from `authority.tenant` in the configuration.
///
/// # Errors
///
/// Returns [`AdalError::MissingParameter`] when neither a URL nor a tenant
/// is available, and the context construction errors otherwise.
pub fn resolve_context(
    args: &AuthorityArgs,
    options: AuthenticationOptions,
    config: &Config,
) -> Result<AuthenticationContext> {
    if let Some(url) = &args.url {
        return AuthenticationContext::from_authority_url(url, options);
    }

    let tenant = args
        .tenant
        .as_deref()
        .or(config.authority.tenant.as_deref())
        .ok_or_else(|| AdalError::MissingParameter("tenant".to_string()))?;

    AuthenticationContext::new(tenant, options)
}

/// Prints the endpoints of an authority.
///
/// # Errors
///
/// Returns error if the authority cannot be resolved.
pub fn show_endpoints(config: &Config, args: &AuthorityArgs, json: bool) -> Result<()> {
    let context = resolve_context(args, config.authentication_options(), config)?;
    let report = EndpointsReport::from_context(&context);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output_endpoints_table(&report);
    }

    Ok(())
}

/// Validates an authority, forcing validation on.
///
/// # Errors
///
/// Returns error if the authority cannot be resolved or fails validation.
pub async fn validate_authority(config: &Config, args: &AuthorityArgs) -> Result<()> {
    let options = config.authentication_options().with_validate_authority(true);
    let context = resolve_context(args, options, config)?;
    let http = config.http_client()?;

    context.validate_authority(&http).await?;

    println!(
        "Authority https://{}/{} is valid",
        context.authority().host(),
        context.authority().tenant()
    );
    Ok(())
}

/// Acquires a client credentials token and prints it.
///
/// Arguments missing on the command line fall back to the `credentials`
/// section of the configuration. When validation is enabled the authority
/// is validated before the token request.
///
/// # Errors
///
/// Returns error if a parameter is missing, validation fails, or the token
/// endpoint rejects the request.
pub async fn acquire_token(
    config: &Config,
    args: &AuthorityArgs,
    resource: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    json: bool,
) -> Result<()> {
    let context = resolve_context(args, config.authentication_options(), config)?;
    let http = config.http_client()?;

    let resource = resource
        .or_else(|| config.credentials.resource.clone())
        .unwrap_or_default();
    let client_id = client_id
        .or_else(|| config.credentials.client_id.clone())
        .unwrap_or_default();
    let client_secret = client_secret
        .or_else(|| config.credentials.client_secret.clone())
        .unwrap_or_default();

    let source = context.token_source(http.clone(), &resource, &client_id, &client_secret)?;
    context.validate_authority(&http).await?;

    tracing::info!(
        "Requesting token for {} from {}",
        resource,
        context.authority().token_endpoint()
    );
    let token = source.token().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&token)?);
    } else {
        println!("{}", token.access_token);
    }

    Ok(())
}

fn output_endpoints_table(report: &EndpointsReport) {
    let mut table = Table::new();
    table.add_row(row!["Host", report.host]);
    table.add_row(row!["Tenant", report.tenant]);
    table.add_row(row!["ADFS", report.adfs]);
    table.add_row(row!["Validated", report.validated]);
    table.add_row(row!["Authorize", report.authorize_endpoint]);
    table.add_row(row!["Token", report.token_endpoint]);
    table.add_row(row!["Device code", report.device_code_endpoint]);
    table.printstd();
}
