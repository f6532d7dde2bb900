//! Configuration management for the Coffee Roast Tracker
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with ROASTLOG_ prefix

use std::path::{Path, PathBuf};

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Local storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Spreadsheet export configuration
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// SQLite file holding the key-value store
    pub database_path: PathBuf,

    /// Seconds to wait on a locked database file
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by RUST_LOG
    pub filter: String,

    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Directory for exported sheets when no output path is given
    pub directory: PathBuf,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ROASTLOG_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &environment)
    }

    /// Load configuration with config files looked up in `config_dir`
    pub fn load_from(config_dir: &Path, environment: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("storage.database_path", "./data/roastlog.sqlite")?
            .set_default("storage.busy_timeout_secs", 30)?
            .set_default("logging.filter", "roastlog=info,roast_tracker=info,sqlx=warn")?
            .set_default("logging.json", false)?
            .set_default("export.directory", "./exports")?
            // Load environment-specific config file
            .add_source(
                File::with_name(&config_dir.join(environment).to_string_lossy()).required(false),
            )
            // Override with environment variables (ROASTLOG_ prefix)
            .add_source(
                Environment::with_prefix("ROASTLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Point storage at a different database file
    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.storage.database_path = path;
        }
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/roastlog.sqlite"),
            busy_timeout_secs: 30,
        }
    }
}
