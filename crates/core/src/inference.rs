//! The inference seam: component B (`VadIterator`, in `cascade-vad-engine`)
//! drives whatever implements [`VoiceInference`] without caring whether
//! it's a real neural network or a cheap stand-in.

use crate::audio::AudioFrame;
use crate::error::Result;

/// A frame-at-a-time speech probability model.
///
/// Implementors own whatever recurrent state the model needs (e.g. an
/// LSTM's hidden/cell tensors) behind `&mut self`; callers never reach in
/// to inspect it directly. `reset_states` must return the implementor to
/// its just-constructed state.
pub trait VoiceInference: Send {
    /// Probability that `frame` contains speech, in `[0.0, 1.0]`.
    fn infer(&mut self, frame: &AudioFrame) -> Result<f32>;

    /// Clear any recurrent state, as if newly constructed.
    fn reset_states(&mut self);
}

/// Energy in decibels relative to full scale for one frame's samples.
/// `-100.0` for a silent (all-zero) frame rather than `-inf`.
pub fn frame_energy_db(frame: &AudioFrame) -> f32 {
    let samples = frame.as_slice();
    let mean_square: f32 =
        samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    if mean_square <= 0.0 {
        return -100.0;
    }
    10.0 * mean_square.log10()
}

/// A dependency-free stand-in for a neural VAD: reports speech whenever a
/// frame's energy exceeds `floor_db`. Exists so the rest of the engine
/// (and its tests) can run without an ONNX model loaded; the real model
/// lives behind the `onnx` feature in `cascade-vad-engine`.
#[derive(Debug, Clone)]
pub struct EnergyInference {
    floor_db: f32,
}

impl EnergyInference {
    /// `floor_db` below which a frame is reported as silence with
    /// probability `0.0`; at/above it, probability is `1.0`.
    pub fn new(floor_db: f32) -> Self {
        Self { floor_db }
    }
}

impl Default for EnergyInference {
    fn default() -> Self {
        // Matches the teacher's `VAD_ENERGY_FLOOR_DB` constant.
        Self::new(-50.0)
    }
}

impl VoiceInference for EnergyInference {
    fn infer(&mut self, frame: &AudioFrame) -> Result<f32> {
        let energy = frame_energy_db(frame);
        Ok(if energy >= self.floor_db { 1.0 } else { 0.0 })
    }

    fn reset_states(&mut self) {
        // Stateless; nothing to clear.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FRAME_SAMPLES;

    #[test]
    fn silent_frame_has_floor_energy() {
        let frame = AudioFrame::new([0.0; FRAME_SAMPLES], 0);
        assert_eq!(frame_energy_db(&frame), -100.0);
    }

    #[test]
    fn loud_frame_has_higher_energy_than_quiet() {
        let loud = AudioFrame::new([0.9; FRAME_SAMPLES], 0);
        let quiet = AudioFrame::new([0.01; FRAME_SAMPLES], 0);
        assert!(frame_energy_db(&loud) > frame_energy_db(&quiet));
    }

    #[test]
    fn energy_inference_reports_silence_below_floor() {
        let mut inf = EnergyInference::new(-40.0);
        let frame = AudioFrame::new([0.0; FRAME_SAMPLES], 0);
        assert_eq!(inf.infer(&frame).unwrap(), 0.0);
    }

    #[test]
    fn energy_inference_reports_speech_above_floor() {
        let mut inf = EnergyInference::new(-50.0);
        let frame = AudioFrame::new([0.5; FRAME_SAMPLES], 0);
        assert_eq!(inf.infer(&frame).unwrap(), 1.0);
    }

    #[test]
    fn reset_states_is_a_no_op() {
        let mut inf = EnergyInference::default();
        inf.reset_states();
    }
}
