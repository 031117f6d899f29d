//! Runtime configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, then `VINYL_*` environment variables (a `.env` file
//! is loaded into the environment by the binary before this runs).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::collector::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::error::{Result, TrackerError};
use crate::logging::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "vinyl.toml";
pub const DEFAULT_INPUT_FILE: &str = "input.txt";
pub const DEFAULT_BIND: &str = "0.0.0.0:8999";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Database path that opens an in-memory database instead of a file.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub scrape: ScrapeConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Newline-delimited list of product URLs.
    pub input: PathBuf,
    /// Maximum number of fetches in flight at once.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
        }
    }
}

/// File locations for the JSON archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub current: PathBuf,
    pub history: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            current: PathBuf::from("records.json"),
            history: PathBuf::from("history.json"),
        }
    }
}

impl Config {
    /// Load configuration from `path`, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                TrackerError::Config(format!("failed to read {}: {}", path.display(), e))
            })?;
            Self::from_toml_str(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TrackerError::Config(format!("failed to parse config: {}", e)))
    }

    /// Override values from `VINYL_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VINYL_DB_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("VINYL_INPUT") {
            self.scrape.input = PathBuf::from(v);
        }
        if let Some(v) = lookup("VINYL_CONCURRENCY") {
            self.scrape.concurrency = parse_env("VINYL_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("VINYL_TIMEOUT_SECS") {
            self.scrape.timeout_secs = parse_env("VINYL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("VINYL_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("VINYL_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(TrackerError::Config("database.path cannot be empty".into()));
        }
        if self.scrape.input.as_os_str().is_empty() {
            return Err(TrackerError::Config("scrape.input cannot be empty".into()));
        }
        if self.scrape.concurrency == 0 {
            return Err(TrackerError::Config(
                "scrape.concurrency must be at least 1".into(),
            ));
        }
        if self.scrape.timeout_secs == 0 {
            return Err(TrackerError::Config(
                "scrape.timeout_secs must be at least 1".into(),
            ));
        }
        if self.server.bind.is_empty() {
            return Err(TrackerError::Config("server.bind cannot be empty".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TrackerError::Config(format!("invalid value for {}: {:?}", key, value)))
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("vinyl-tracker").join("records.duckdb")
    } else {
        PathBuf::from(".vinyl-tracker/records.duckdb")
    }
}
