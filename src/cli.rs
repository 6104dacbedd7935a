//! CLI definitions for livecam.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// livecam CLI.
#[derive(Parser)]
#[command(name = "livecam")]
#[command(about = "Webcam source resolution and stream proxy")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the server in foreground (default)
    Run {
        /// Marker registry served to the session endpoints
        #[arg(long, default_value = "config/markers.json")]
        markers: PathBuf,

        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve a single marker and print the outcome as JSON
    Resolve {
        /// Marker registry file
        #[arg(long, default_value = "config/markers.json")]
        markers: PathBuf,

        /// Marker id to resolve
        #[arg(long)]
        marker: String,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}
