//! Env-backed defaults that don't belong on any one `Settings` field because
//! they're read once, at the process boundary, rather than layered through
//! `config::Config`.

use once_cell::sync::Lazy;

/// Prefix for environment-variable overrides, e.g. `CASCADE_VAD__VAD__THRESHOLD`.
pub const ENV_PREFIX: &str = "CASCADE_VAD";

/// Default search path for the layered config file (see [`crate::settings::load_settings`]).
pub const DEFAULT_CONFIG_BASENAME: &str = "config/default";

/// Path to the Silero ONNX model, only consulted when the `onnx` feature is
/// enabled on `cascade-vad-engine`.
pub static DEFAULT_MODEL_PATH: Lazy<String> =
    Lazy::new(|| std::env::var("CASCADE_VAD_MODEL_PATH").unwrap_or_else(|_| "models/silero_vad.onnx".to_string()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_prefix_is_stable() {
        assert_eq!(ENV_PREFIX, "CASCADE_VAD");
    }
}
