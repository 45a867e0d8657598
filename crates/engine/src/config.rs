//! Tunables for the hysteresis in [`crate::vad_iterator::VadIterator`].

use serde::{Deserialize, Serialize};

/// Margin below `threshold` at which a silence countdown begins. The
/// Silero convention; preserved for model compatibility, not user-tunable.
pub const SILENCE_MARGIN: f32 = 0.15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VADConfig {
    /// Probability at/above which a frame counts as speech.
    pub threshold: f32,
    /// Padding, in ms, prepended before `start` and appended after `end`.
    pub speech_pad_ms: u32,
    /// Silence duration, in ms, required after a speech run before `end`
    /// is emitted. Independent of `speech_pad_ms` (see design notes).
    pub min_silence_duration_ms: u32,
    /// Fixed at 16000; carried for self-description, never varied.
    pub sample_rate: u32,
}

impl Default for VADConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            speech_pad_ms: 100,
            min_silence_duration_ms: 100,
            sample_rate: 16_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_silero_convention() {
        let c = VADConfig::default();
        assert_eq!(c.threshold, 0.5);
        assert_eq!(c.sample_rate, 16_000);
    }
}
