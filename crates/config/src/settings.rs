//! Layered settings: file + environment variable overrides + hardcoded
//! defaults, following the teacher's `config`-crate-based loading pattern.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use cascade_vad_engine::VADConfig;
use cascade_vad_interrupt::InterruptionConfig;

use crate::constants::{DEFAULT_CONFIG_BASENAME, ENV_PREFIX};
use crate::ConfigError;

/// Runtime environment: governs how strictly [`Settings::validate`] treats
/// a missing or unreasonable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Bundles everything one `StreamProcessor` needs to open, plus the model
/// handle it should be constructed with.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub vad: VADConfig,
    #[serde(default)]
    pub interruption: InterruptionConfig,
    /// Capacity of the inference worker's two channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Path to the ONNX Silero model, consulted only when the `onnx`
    /// feature is compiled into `cascade-vad-engine`.
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Below this energy, skip inference and score the frame as silence.
    /// `None` disables the gate.
    #[serde(default = "default_energy_gate_db")]
    pub energy_gate_db: Option<f32>,
}

fn default_channel_capacity() -> usize {
    8
}

fn default_model_path() -> String {
    crate::constants::DEFAULT_MODEL_PATH.clone()
}

fn default_energy_gate_db() -> Option<f32> {
    Some(-50.0)
}

/// Observability configuration, following the teacher's `tracing`-based
/// logging setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Top-level settings for the engine process.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate ranges and, in strict environments, required paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_vad()?;
        self.validate_interruption()?;
        self.validate_model_path()?;
        Ok(())
    }

    fn validate_vad(&self) -> Result<(), ConfigError> {
        let vad = &self.engine.vad;
        if !(0.0..=1.0).contains(&vad.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "engine.vad.threshold".to_string(),
                message: format!("must be between 0.0 and 1.0, got {}", vad.threshold),
            });
        }
        if vad.sample_rate != 16_000 {
            return Err(ConfigError::InvalidValue {
                field: "engine.vad.sample_rate".to_string(),
                message: "only 16000 Hz is supported end to end".to_string(),
            });
        }
        if self.engine.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.channel_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn validate_interruption(&self) -> Result<(), ConfigError> {
        // min_interval_ms of 0 is a legitimate "never throttle" choice; no
        // range beyond u32's own bounds is meaningful here.
        let _ = &self.engine.interruption;
        Ok(())
    }

    fn validate_model_path(&self) -> Result<(), ConfigError> {
        let path = Path::new(&self.engine.model_path);
        if !path.exists() {
            if self.environment.is_strict() {
                return Err(ConfigError::InvalidValue {
                    field: "engine.model_path".to_string(),
                    message: format!("model file not found: {}", self.engine.model_path),
                });
            }
            tracing::warn!(path = %self.engine.model_path, "VAD model not found; EnergyInference fallback will be used");
        }
        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`CASCADE_VAD__` prefix, `__` separated)
/// 2. `config/{env}.toml` (when `env` is given)
/// 3. `config/default.toml`
/// 4. Struct defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true));

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid_in_development() {
        let settings = Settings::default();
        assert_eq!(settings.environment, RuntimeEnvironment::Development);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut settings = Settings::default();
        settings.engine.vad.threshold = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_channel_capacity_is_rejected() {
        let mut settings = Settings::default();
        settings.engine.channel_capacity = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_model_path_is_fatal_only_when_strict() {
        let mut settings = Settings::default();
        settings.engine.model_path = "/definitely/not/a/real/path.onnx".to_string();
        assert!(settings.validate().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());
    }
}
