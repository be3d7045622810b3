//! Configuration infrastructure
//!
//! Contains configuration loading and management for menu scraping.
//!
//! Configuration is organized into four sections:
//! 1. Scraper settings (which locations, how to fetch them)
//! 2. Extraction settings (page markers, attribute mapping)
//! 3. Output settings (snapshot sinks)
//! 4. Logging settings

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::location::DiningLocation;
use crate::infrastructure::parsing::ExtractionConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Fetching settings
    pub scraper: ScraperConfig,

    /// Page layout and attribute mapping
    pub extraction: ExtractionConfig,

    /// Snapshot sinks
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which menus to fetch and how
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Dining site root, e.g. `https://umassdining.com`
    pub base_url: String,

    /// Locations scraped each cycle, in order
    pub locations: Vec<DiningLocation>,

    /// User agent sent with every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Pause between two locations in milliseconds
    pub request_delay_ms: u64,

    /// Whether to follow redirects
    pub follow_redirects: bool,
}

/// Output format of a snapshot sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// `{ timestamp, date, foods }` document
    Json,
    /// One row per record, header row, no timestamp
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub path: PathBuf,
}

impl SinkConfig {
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SinkKind::Json,
            path: path.into(),
        }
    }

    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: SinkKind::Csv,
            path: path.into(),
        }
    }
}

/// Where snapshots are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Every sink is rewritten wholesale on a successful cycle
    pub sinks: Vec<SinkConfig>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: umass_dining::BASE_URL.to_string(),
            locations: DiningLocation::ALL.to_vec(),
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            request_delay_ms: defaults::REQUEST_DELAY_MS,
            follow_redirects: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sinks: vec![SinkConfig::json(defaults::SNAPSHOT_PATH)],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from the configuration file
    File,
    /// No file; defaults used
    NotFound,
    /// File could not be parsed; defaults used
    Malformed(String),
}

impl ConfigOrigin {
    /// Report the origin; call once logging is installed
    pub fn log(&self, config_path: &Path) {
        match self {
            Self::File => info!("Loaded configuration from: {:?}", config_path),
            Self::NotFound => info!("Configuration file not found, using defaults: {:?}", config_path),
            Self::Malformed(parse_error) => {
                warn!("⚠️  Configuration file could not be parsed: {}", parse_error);
                warn!("⚠️  Falling back to default configuration");
            }
        }
    }
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Configuration manager for the per-user config file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, falling back to defaults when it is
    /// missing or malformed
    pub async fn load_config(&self) -> Result<AppConfig> {
        let (config, origin) = self.load_config_with_origin().await?;
        origin.log(&self.config_path);
        Ok(config)
    }

    /// Load configuration without logging; the origin tells the caller
    /// whether defaults were substituted and why
    pub async fn load_config_with_origin(&self) -> Result<(AppConfig, ConfigOrigin)> {
        if !self.config_path.exists() {
            return Ok((AppConfig::default(), ConfigOrigin::NotFound));
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .with_context(|| format!("Failed to read configuration file: {:?}", self.config_path))?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => Ok((config, ConfigOrigin::File)),
            Err(parse_error) => Ok((
                AppConfig::default(),
                ConfigOrigin::Malformed(parse_error.to_string()),
            )),
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Dining site URLs
pub mod umass_dining {
    /// Base URL of the dining site
    pub const BASE_URL: &str = "https://umassdining.com";

    /// Menu page path; `{}` is the location segment
    pub const MENU_PATH: &str = "/locations-menus/{}/menu";
}

/// Default configuration values
pub mod defaults {
    /// Directory name under the user config dir
    pub const APP_DIR_NAME: &str = "dining-menu-scraper";

    /// Config file name
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Structured snapshot location, relative to the working directory
    pub const SNAPSHOT_PATH: &str = "data/foodData.json";

    /// Browser-like identity; the menu site rejects unknown agents
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default pause between locations in milliseconds
    pub const REQUEST_DELAY_MS: u64 = 5000;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;
}

/// URL building helper functions
pub mod utils {
    use super::umass_dining::MENU_PATH;
    use crate::domain::location::DiningLocation;
    use url::Url;

    /// Menu page URL of a location under `base_url`
    pub fn menu_url(base_url: &str, location: DiningLocation) -> Result<Url, url::ParseError> {
        let path = MENU_PATH.replace("{}", location.as_str());
        Url::parse(base_url)?.join(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_all_locations() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.locations, DiningLocation::ALL.to_vec());
        assert_eq!(config.scraper.request_delay_ms, 5000);
        assert_eq!(config.output.sinks[0], SinkConfig::json(defaults::SNAPSHOT_PATH));
    }

    #[test]
    fn test_menu_url() {
        let url = utils::menu_url("https://umassdining.com", DiningLocation::Franklin).unwrap();
        assert_eq!(url.as_str(), "https://umassdining.com/locations-menus/franklin/menu");

        let url = utils::menu_url("http://127.0.0.1:8080/", DiningLocation::Berkshire).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/locations-menus/berkshire/menu");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{
            "scraper": { "locations": ["worcester"], "request_delay_ms": 0 },
            "output": { "sinks": [ { "kind": "csv", "path": "out/foods.csv" } ] }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.scraper.locations, vec![DiningLocation::Worcester]);
        assert_eq!(config.scraper.base_url, umass_dining::BASE_URL);
        assert_eq!(config.output.sinks, vec![SinkConfig::csv("out/foods.csv")]);
        assert!(config.output.sinks.iter().all(|sink| sink.kind != SinkKind::Json));
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn test_config_manager_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested/config.json"));

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.scraper.locations.len(), 4);

        let mut config = AppConfig::default();
        config.scraper.locations = vec![DiningLocation::Hampshire];
        manager.save_config(&config).await.unwrap();

        let reloaded = manager.load_config().await.unwrap();
        assert_eq!(reloaded.scraper.locations, vec![DiningLocation::Hampshire]);
    }

    #[tokio::test]
    async fn test_malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = ConfigManager::with_path(&path).load_config().await.unwrap();
        assert_eq!(config.scraper.locations, DiningLocation::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_malformed_config_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (config, origin) = ConfigManager::with_path(&path).load_config_with_origin().await.unwrap();
        assert_eq!(config.scraper.locations, DiningLocation::ALL.to_vec());
        let ConfigOrigin::Malformed(reason) = origin else {
            panic!("expected malformed origin, got {origin:?}");
        };
        assert!(!reason.is_empty());

        let missing = ConfigManager::with_path(dir.path().join("absent.json"));
        let (_, origin) = missing.load_config_with_origin().await.unwrap();
        assert_eq!(origin, ConfigOrigin::NotFound);
    }
}
