//! Layered runtime configuration for the cascade VAD engine: file +
//! environment variable overrides + struct defaults, via the `config`
//! crate, the same way the teacher's settings module is built.

pub mod constants;
pub mod settings;

pub use settings::{load_settings, EngineConfig, ObservabilityConfig, RuntimeEnvironment, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
