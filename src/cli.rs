//! Command-line interface definition for ADAL
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to inspect and validate authorities and to acquire
//! client credentials tokens.

use clap::{Args, Parser, Subcommand};

/// ADAL - Azure Active Directory authority and token helper
#[derive(Parser, Debug, Clone)]
#[command(name = "adal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "adal.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the authority host used with tenant names
    #[arg(long, global = true)]
    pub authority_host: Option<String>,

    /// Require authority validation
    #[arg(long, global = true)]
    pub validate_authority: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Authority selection shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct AuthorityArgs {
    /// Tenant name, combined with the authority host
    #[arg(conflicts_with = "url")]
    pub tenant: Option<String>,

    /// Literal authority URL, e.g. https://login.microsoftonline.com/contoso
    #[arg(long)]
    pub url: Option<String>,
}

/// Available commands for ADAL
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the endpoints derived from an authority
    Endpoints {
        #[command(flatten)]
        authority: AuthorityArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an authority against the well-known hosts or instance discovery
    Validate {
        #[command(flatten)]
        authority: AuthorityArgs,
    },

    /// Acquire an access token with the client credentials grant
    Token {
        #[command(flatten)]
        authority: AuthorityArgs,

        /// Resource the token is requested for
        #[arg(long)]
        resource: Option<String>,

        /// Application (client) ID
        #[arg(long)]
        client_id: Option<String>,

        /// Application secret
        #[arg(long)]
        client_secret: Option<String>,

        /// Print the full token as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("adal.yaml".to_string()),
            verbose: false,
            authority_host: None,
            validate_authority: false,
            timeout_seconds: None,
            command: Commands::Endpoints {
                authority: AuthorityArgs::default(),
                json: false,
            },
        }
    }
}
