//! livecam - webcam source resolution and stream proxy
//!
//! Main entry point for the livecam CLI and server.

mod cli;
mod cmd_resolve;
mod server;

use clap::Parser;

use livecam_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};
use crate::cmd_resolve::{check_config, resolve_marker};
use crate::server::{init_tracing, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load_or_default(&cli.config)?;

    init_tracing(&config.logging)?;

    match cli.command {
        Some(Commands::CheckConfig) => check_config(&config, &cli.config),
        Some(Commands::Resolve { markers, marker }) => {
            resolve_marker(&config, &markers, &marker).await
        }
        Some(Commands::Run {
            markers,
            host,
            port,
        }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            validate(&config)?;
            run_server(config, &markers).await
        }
        None => {
            validate(&config)?;
            run_server(config, "config/markers.json".as_ref()).await
        }
    }
}

/// Refuse to start on an invalid configuration; log warnings.
fn validate(config: &livecam_config::Config) -> Result<(), Box<dyn std::error::Error>> {
    for warning in ConfigValidator::validate(config).into_result()? {
        tracing::warn!("Config {}: {}", warning.path, warning.message);
    }
    Ok(())
}
