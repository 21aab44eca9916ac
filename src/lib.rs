//! ADAL - Azure Active Directory authority and client credentials library
//!
//! This library resolves an authority (identity provider host plus tenant),
//! optionally validates it against the well-known authority hosts or the
//! instance discovery endpoint, derives its OAuth2 endpoints, and performs
//! client credentials exchanges against its token endpoint.
//!
//! # Architecture
//!
//! - `options`: well-known hosts, endpoint constants and construction options
//! - `authority`: authority URL parsing, endpoint derivation and validation
//! - `discovery`: instance discovery protocol
//! - `credentials`: client credentials grant, token sources and authorized clients
//! - `context`: the `AuthenticationContext` facade
//! - `config`: configuration loading and validation for the CLI
//! - `error`: error types and result aliases
//! - `cli`, `commands`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use adal::{AuthenticationContext, AuthenticationOptions};
//! use adal::credentials::TokenProvider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = AuthenticationOptions::default().with_validate_authority(true);
//!     let context = AuthenticationContext::new("contoso.onmicrosoft.com", options)?;
//!
//!     let http = reqwest::Client::new();
//!     context.validate_authority(&http).await?;
//!
//!     let source =
//!         context.token_source(http, "https://vault.azure.net", "client-id", "client-secret")?;
//!     let token = source.token().await?;
//!     println!("expires at {:?}", token.expires_at);
//!     Ok(())
//! }
//! ```

pub mod authority;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod options;

// Re-export commonly used types
pub use authority::Authority;
pub use config::Config;
pub use context::AuthenticationContext;
pub use credentials::{AccessToken, AuthorizedClient, ClientCredentialsConfig, TokenSource};
pub use error::{AdalError, Result};
pub use options::AuthenticationOptions;
