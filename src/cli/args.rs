//! CLI argument definitions using clap
//!
//! Commands:
//! - bookreview serve --config <path> [--port <n>]
//! - bookreview check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bookreview - HTTP API for book reviews kept in a hosted table
#[derive(Parser, Debug)]
#[command(name = "bookreview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./bookreview.json")]
        config: PathBuf,

        /// Port to listen on, overrides the configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate the configuration and print it with secrets masked
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./bookreview.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
