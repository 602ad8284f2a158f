//! CLI module for bookreview
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the HTTP server
//! - check-config: Validate and print the effective configuration

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, run, run_command, serve};
pub use config::{Config, LogConfig, StoreConfig, ENV_API_TOKEN, ENV_BASE_ID, ENV_PORT, ENV_TABLE_ID};
pub use errors::{CliError, CliErrorCode, CliResult};
