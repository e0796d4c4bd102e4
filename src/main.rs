//! SHIPSmart - UC SHIP insurance assistant CLI
//!
#![doc = "SHIPSmart - UC SHIP insurance assistant CLI"]
#![doc = "Main entry point for the SHIPSmart terminal front end."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shipsmart::cli::{Cli, Commands};
use shipsmart::commands;
use shipsmart::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so logging flags apply
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { user } => {
            if let Some(name) = &user {
                tracing::debug!("Signing in as: {}", name);
            }
            commands::chat::run_chat(config, user).await?;
            Ok(())
        }
        Commands::Ask { text, json } => {
            tracing::info!("Answering one message");
            commands::ask::run_ask(config, text, json).await?;
            Ok(())
        }
        Commands::Validate { text } => {
            commands::inspect::run_validate(&text)?;
            Ok(())
        }
        Commands::Classify { text } => {
            commands::inspect::run_classify(&text)?;
            Ok(())
        }
        Commands::Doctors => {
            commands::inspect::run_doctors()?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "shipsmart=debug"
    } else {
        "shipsmart=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
