//! Configuration file support for the nacre shell.
//!
//! Configuration is read from `config.toml` in the platform's configuration directory
//! for `nacre`. The file is optional; unknown fields are ignored, and a file that cannot
//! be read or parsed is reported and otherwise treated as absent.

use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;

use crate::events::TraceEvent;

/// Root configuration structure for the nacre shell.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// History configuration.
    pub history: HistoryConfig,
}

/// Logging configuration options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Trace events to enable.
    pub enable: Vec<TraceEvent>,
}

/// History configuration options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Name of the history file, relative to the initial working directory.
    pub file: Option<PathBuf>,

    /// Maximum number of history entries to retain.
    #[serde(rename = "max-entries", alias = "max_entries")]
    pub max_entries: Option<usize>,
}

/// Result of attempting to load a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration, or default if loading failed.
    pub config: Config,

    /// The path that was used (or attempted) for loading.
    pub path: Option<PathBuf>,

    /// Any error that occurred during loading.
    pub error: Option<ConfigLoadError>,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML content.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returns the default configuration file path for the current platform.
///
/// Returns `None` if the platform's config directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("nacre").join("config.toml"))
}

/// Loads configuration from the specified path.
///
/// # Arguments
///
/// * `path` - The file to load.
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    let parsed = std::fs::read_to_string(path)
        .map_err(ConfigLoadError::from)
        .and_then(|content| Ok(toml::from_str::<Config>(&content)?));

    match parsed {
        Ok(config) => ConfigLoadResult {
            config,
            path: Some(path.to_path_buf()),
            error: None,
        },
        Err(e) => ConfigLoadResult {
            config: Config::default(),
            path: Some(path.to_path_buf()),
            error: Some(e),
        },
    }
}

/// Loads configuration from the default location. A missing file yields the defaults
/// without error.
pub fn load_config() -> ConfigLoadResult {
    let Some(path) = default_config_path() else {
        // Can't determine config path; use defaults silently
        return ConfigLoadResult {
            config: Config::default(),
            path: None,
            error: None,
        };
    };

    if !path.exists() {
        return ConfigLoadResult {
            config: Config::default(),
            path: Some(path),
            error: None,
        };
    }

    load_from_path(&path)
}
