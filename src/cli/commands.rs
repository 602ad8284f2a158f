//! CLI command implementations
//!
//! `serve` boots in a fixed order: config, logger, store client, review
//! service, HTTP server. Any failure before the listener is bound ends the
//! process.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::reviews::ReviewService;
use crate::table_store::{AirtableStore, TableStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};

/// Parse arguments and run the chosen command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::CheckConfig { config } => {
            let stdout = io::stdout();
            check_config(&config, &mut stdout.lock())
        }
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    Config::load(config_path).map_err(|e| {
        log_event_with_fields(Event::ConfigInvalid, &[("reason", e.message())]);
        e
    })
}

/// Start the HTTP server and block until shutdown
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event(Event::BootStart);

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    Logger::set_min_severity(config.log.min_severity);

    let path = config_path.display().to_string();
    let port = config.server.port.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("path", path.as_str()), ("port", port.as_str())],
    );

    let settings = config.airtable_settings()?;
    let store = AirtableStore::new(settings)
        .map_err(|e| CliError::boot_failed(format!("Failed to build store client: {}", e)))?;
    let table_url = store.table_url().to_string();
    let store: Arc<dyn TableStore> = Arc::new(store);
    log_event_with_fields(
        Event::StoreClientReady,
        &[("store", store.name()), ("table_url", table_url.as_str())],
    );

    let service = Arc::new(ReviewService::new(store, config.reviews.clone()));
    let server = HttpServer::new(config.server.clone(), service, config.text.clone());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    log_event(Event::BootComplete);

    rt.block_on(async {
        server.start().await.map_err(|e| {
            let reason = e.to_string();
            log_event_with_fields(Event::ServerFailed, &[("reason", reason.as_str())]);
            CliError::boot_failed(format!("HTTP server failed: {}", e))
        })
    })
}

/// Load and validate the configuration, then print it with the token masked
pub fn check_config<W: Write>(config_path: &Path, out: &mut W) -> CliResult<()> {
    let config = load_config(config_path)?;
    serde_json::to_writer_pretty(&mut *out, &config.redacted())?;
    writeln!(out)?;
    Ok(())
}
