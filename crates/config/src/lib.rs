//! Configuration management for the transliteration workspace
//!
//! Supports loading configuration from:
//! - TOML files (`config/default.toml`, `config/{env}.toml`)
//! - Environment variables (`GU_XLIT__` prefix, `__` separator)
//! - Runtime overrides

pub mod settings;

pub use settings::{
    load_settings, load_settings_from, EngineProvider, EngineSettings, ExportSettings,
    ObservabilityConfig, RuntimeEnvironment, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for gu_xlit_core::Error {
    fn from(err: ConfigError) -> Self {
        gu_xlit_core::Error::Configuration(err.to_string())
    }
}
