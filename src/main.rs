//! ADAL - Azure Active Directory authority and token helper
//!
#![doc = "Main entry point for the adal command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use adal::cli::{Cli, Commands};
use adal::commands;
use adal::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("adal.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Endpoints { authority, json } => {
            tracing::debug!("Showing authority endpoints");
            commands::show_endpoints(&config, &authority, json)?;
            Ok(())
        }
        Commands::Validate { authority } => {
            tracing::info!("Validating authority");
            commands::validate_authority(&config, &authority).await?;
            Ok(())
        }
        Commands::Token {
            authority,
            resource,
            client_id,
            client_secret,
            json,
        } => {
            tracing::info!("Acquiring client credentials token");
            commands::acquire_token(
                &config,
                &authority,
                resource,
                client_id,
                client_secret,
                json,
            )
            .await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "adal=debug" } else { "adal=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
