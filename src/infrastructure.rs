//! Infrastructure layer for fetching, parsing, persistence and configuration
//!
//! This module provides the HTTP client, the menu page parser, the snapshot
//! store and the configuration/logging setup.

pub mod config; // Configuration file and defaults
pub mod logging; // Logging infrastructure
pub mod parsing; // Menu page extraction
pub mod parsing_error; // Parsing error types
pub mod simple_http_client;
pub mod snapshot_store;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, ConfigOrigin, SinkConfig, SinkKind, umass_dining};
pub use logging::{get_log_directory, init_logging, init_logging_with_config, log_system_info};
pub use parsing::{ExtractionConfig, MenuParser, ParsingError, ParsingResult};
pub use simple_http_client::{FetchError, HttpClient, HttpClientConfig, HttpMenuSource};
pub use snapshot_store::{SnapshotReadError, SnapshotStore, StoreError};
