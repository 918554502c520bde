//! Configuration module
//!
//! Loads configuration from environment variables (a `.env` file is read by
//! the binary before this runs).

use std::env;
use std::path::PathBuf;

use crate::storage::DEFAULT_DATA_FILE;

pub const DEFAULT_LOG_FILTER: &str = "dyonak=warn";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the JSON data file
    pub data_path: PathBuf,

    /// `tracing` filter directive, e.g. `dyonak=debug`
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = match lookup("DYONAK_DATA") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidValue("DYONAK_DATA"));
            }
            Some(value) => PathBuf::from(value),
            None => defaults.data_path,
        };

        let log_filter = match lookup("DYONAK_LOG") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidValue("DYONAK_LOG"));
            }
            Some(value) => value,
            None => defaults.log_filter,
        };

        Ok(Self {
            data_path,
            log_filter,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
