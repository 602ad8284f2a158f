//! Configuration file
//!
//! JSON, every section optional. A missing file means all defaults.
//! Credentials may instead come from the environment, which wins over the
//! file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::reviews::ReviewsConfig;
use crate::table_store::{AirtableSettings, DEFAULT_API_URL};
use crate::text::TextConfig;

use super::errors::{CliError, CliResult};

/// Environment variable holding the API token
pub const ENV_API_TOKEN: &str = "API_TOKEN";
/// Environment variable holding the base id
pub const ENV_BASE_ID: &str = "BASE_ID";
/// Environment variable holding the table id or name
pub const ENV_TABLE_ID: &str = "TABLE_ID";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "BOOKREVIEW_PORT";

const REDACTED: &str = "********";

/// Remote table store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub base_id: Option<String>,

    #[serde(default)]
    pub table_id: Option<String>,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            base_id: None,
            table_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}

fn default_min_severity() -> Severity {
    Severity::Info
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_severity: default_min_severity(),
        }
    }
}

/// Complete process configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub reviews: ReviewsConfig,

    #[serde(default)]
    pub text: TextConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load from file, apply process environment overrides, validate
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup
    pub fn load_with_env<F>(path: &Path, env: F) -> CliResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
            serde_json::from_str::<Config>(&content)
                .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?
        } else {
            let shown = path.display().to_string();
            log_event_with_fields(Event::ConfigDefaulted, &[("path", shown.as_str())]);
            Config::default()
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay non-empty environment values onto the file values
    pub fn apply_env<F>(&mut self, env: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.store.api_token = Some(token);
        }
        if let Some(base) = lookup(ENV_BASE_ID) {
            self.store.base_id = Some(base);
        }
        if let Some(table) = lookup(ENV_TABLE_ID) {
            self.store.table_id = Some(table);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| {
                CliError::config_error(format!("Invalid {}: '{}'", ENV_PORT, port))
            })?;
        }
        Ok(())
    }

    /// Validate value ranges. Credentials are checked by `airtable_settings`.
    pub fn validate(&self) -> CliResult<()> {
        if self.store.timeout_secs == 0 {
            return Err(CliError::config_error("store.timeout_secs must be > 0"));
        }

        self.reviews.validate().map_err(CliError::config_error)?;

        if self.text.max_duplication_factor == 0 {
            return Err(CliError::config_error(
                "text.max_duplication_factor must be > 0",
            ));
        }

        Ok(())
    }

    /// Store client settings; fails when any credential is missing
    pub fn airtable_settings(&self) -> CliResult<AirtableSettings> {
        fn credential(value: &Option<String>, key: &str, env: &str) -> CliResult<String> {
            value.clone().ok_or_else(|| {
                CliError::missing_credential(format!(
                    "store.{} is not set (config file or {} environment variable)",
                    key, env
                ))
            })
        }

        Ok(AirtableSettings {
            api_url: self.store.api_url.clone(),
            api_token: credential(&self.store.api_token, "api_token", ENV_API_TOKEN)?,
            base_id: credential(&self.store.base_id, "base_id", ENV_BASE_ID)?,
            table_id: credential(&self.store.table_id, "table_id", ENV_TABLE_ID)?,
            timeout: Duration::from_secs(self.store.timeout_secs),
        })
    }

    /// Copy safe to print: the token is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.store.api_token.is_some() {
            copy.store.api_token = Some(REDACTED.to_string());
        }
        copy
    }
}
