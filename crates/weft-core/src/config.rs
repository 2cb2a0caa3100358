//! Weft configuration.
//!
//! Provides configuration file support via `weft.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (embedding application)
//! 2. Environment variables (`WEFT_*`)
//! 3. Configuration file (`weft.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The canonical epoch all day-offset columns are re-based to.
pub const DEFAULT_ZERO_DAY: &str = "2020-01-21";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Engine configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canonical epoch for day-offset time columns (`YYYY-MM-DD`).
    pub zero_day: String,
    /// Slug of the unified time column injected after a join.
    pub time_slug: String,
    /// Tolerance used by the target-time filter when a column declares none.
    pub default_tolerance: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zero_day: DEFAULT_ZERO_DAY.to_string(),
            time_slug: "time".to_string(),
            default_tolerance: 0,
        }
    }
}

/// CSV export configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Field delimiter. Must be a single ASCII character.
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// Main Weft configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeftConfig {
    /// Engine configuration.
    pub engine: EngineConfig,
    /// CSV export configuration.
    pub export: ExportConfig,
}

impl WeftConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < `weft.toml` < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("weft.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing or validation fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("WEFT_").split("_").lowercase(false));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as a TOML document, e.g. for writing a
    /// starter `weft.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates field values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::time::parse_date(&self.engine.zero_day).map_err(|_| {
            ConfigError::InvalidValue {
                key: "engine.zero_day".to_string(),
                message: format!("'{}' is not a YYYY-MM-DD date", self.engine.zero_day),
            }
        })?;
        if self.engine.time_slug.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "engine.time_slug".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.engine.default_tolerance < 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.default_tolerance".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if !self.export.delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue {
                key: "export.delimiter".to_string(),
                message: "must be a single ASCII character".to_string(),
            });
        }
        Ok(())
    }
}
