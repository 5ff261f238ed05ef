use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/uisync/config.toml` on Unix/macOS, or the equivalent
    /// from `dirs::config_dir()`. Falls back to the current directory.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("uisync").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads and validates configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The default poll interval is non-zero
    /// - Character encoding and servlet URI are set
    /// - Documents may nest at least one element
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.default_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "session.default_poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.session.character_encoding.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "session.character_encoding must not be empty".to_string(),
            });
        }

        if self.session.servlet_uri.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "session.servlet_uri must not be empty".to_string(),
            });
        }

        if self.codec.max_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "codec.max_depth must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
