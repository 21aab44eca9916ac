//! Error types for ADAL
//!
//! This module defines all error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.
//!
//! Fallible functions return [`Result`], an `anyhow` alias, so that each
//! stage (parse, validate, parameter check) can attach context while the
//! underlying [`AdalError`] kind stays recoverable through
//! [`anyhow::Error::downcast_ref`].

use thiserror::Error;

/// Main error type for ADAL operations
///
/// Each variant corresponds to one failure kind of authority parsing,
/// authority validation, or the client credentials exchange.
#[derive(Error, Debug)]
pub enum AdalError {
    /// The authority string is not a parseable absolute URI
    #[error("Malformed authority URL: {0}")]
    MalformedUrl(String),

    /// The authority URL does not use the `https` scheme
    #[error("The authority url must be an https endpoint: {0}")]
    InvalidScheme(String),

    /// The authority URL carries a query string
    #[error("The authority url must not have a query string: {0}")]
    UnexpectedQuery(String),

    /// The authority URL has no path segment to use as tenant
    #[error("Could not determine tenant from authority url: {0}")]
    MissingTenant(String),

    /// A required argument was empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// The instance discovery request could not be sent or read
    #[error("Instance discovery transport failure: {0}")]
    DiscoveryTransportFailure(String),

    /// The instance discovery endpoint answered with a non-success status
    #[error("Instance discovery request failed: status={status}")]
    DiscoveryRequestFailed {
        /// HTTP status code returned by the discovery endpoint
        status: u16,
    },

    /// The instance discovery response was malformed or incomplete
    #[error("Failed to parse instance discovery: {0}")]
    DiscoveryResponseInvalid(String),

    /// The token request could not be sent or read
    #[error("Token request transport failure: {0}")]
    TokenTransportFailure(String),

    /// The token endpoint answered with a non-success status
    #[error("Token request failed: status={status}, {body}")]
    TokenRequestFailed {
        /// HTTP status code returned by the token endpoint
        status: u16,
        /// Response body, usually an OAuth2 error document
        body: String,
    },

    /// The token endpoint response could not be decoded
    #[error("Invalid token response: {0}")]
    TokenResponseInvalid(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for ADAL operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
