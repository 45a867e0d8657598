//! Optional neural backend implementing [`cascade_vad_core::VoiceInference`]
//! with the Silero VAD v5 ONNX graph. Gated behind the `onnx` feature so
//! the rest of the engine (and its tests) can run without a model file.

use std::path::Path;

use cascade_vad_core::{AudioFrame, Error, Result, VoiceInference, FRAME_SAMPLES, SAMPLE_RATE_HZ};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

/// Silero VAD v5 uses a 2-layer, 64-hidden-unit LSTM; state shape is
/// fixed by the published graph, not configurable.
const LSTM_LAYERS: usize = 2;
const LSTM_HIDDEN: usize = 64;

/// Owns one ONNX Runtime session plus the LSTM hidden/cell state for one
/// stream. Never shared across streams — state is per-connection, per the
/// 1:1:1:1 design invariant.
pub struct OnnxSileroInference {
    session: Session,
    h_state: Array2<f32>,
    c_state: Array2<f32>,
}

impl OnnxSileroInference {
    /// Load the Silero VAD v5 ONNX graph from `model_path`.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| Error::InferenceFailure(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::InferenceFailure(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| Error::InferenceFailure(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| Error::InferenceFailure(e.to_string()))?;

        Ok(Self {
            session,
            h_state: Array2::zeros((LSTM_LAYERS, LSTM_HIDDEN)),
            c_state: Array2::zeros((LSTM_LAYERS, LSTM_HIDDEN)),
        })
    }
}

impl VoiceInference for OnnxSileroInference {
    fn infer(&mut self, frame: &AudioFrame) -> Result<f32> {
        let input = Array2::from_shape_vec((1, FRAME_SAMPLES), frame.as_slice().to_vec())
            .map_err(|e| Error::InferenceFailure(e.to_string()))?;
        let sr = ndarray::arr1(&[i64::from(SAMPLE_RATE_HZ)]);

        let input_tensor = Tensor::from_array(input).map_err(|e| Error::InferenceFailure(e.to_string()))?;
        let sr_tensor = Tensor::from_array(sr).map_err(|e| Error::InferenceFailure(e.to_string()))?;
        let h_tensor =
            Tensor::from_array(self.h_state.clone()).map_err(|e| Error::InferenceFailure(e.to_string()))?;
        let c_tensor =
            Tensor::from_array(self.c_state.clone()).map_err(|e| Error::InferenceFailure(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input" => input_tensor,
                "sr" => sr_tensor,
                "h" => h_tensor,
                "c" => c_tensor,
            ])
            .map_err(|e| Error::InferenceFailure(e.to_string()))?;

        let (_, speech_data) = outputs
            .get("output")
            .ok_or_else(|| Error::InferenceFailure("missing output tensor".into()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::InferenceFailure(e.to_string()))?;
        let probability = speech_data.first().copied().unwrap_or(0.0);

        if let Some(hn) = outputs.get("hn") {
            let (shape, data) = hn
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::InferenceFailure(e.to_string()))?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            if dims.len() == 2 && data.len() == dims[0] * dims[1] {
                let new_h = ndarray::ArrayView2::from_shape((dims[0], dims[1]), data)
                    .map_err(|e| Error::InferenceFailure(e.to_string()))?;
                self.h_state.assign(&new_h);
            }
        }
        if let Some(cn) = outputs.get("cn") {
            let (shape, data) = cn
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::InferenceFailure(e.to_string()))?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            if dims.len() == 2 && data.len() == dims[0] * dims[1] {
                let new_c = ndarray::ArrayView2::from_shape((dims[0], dims[1]), data)
                    .map_err(|e| Error::InferenceFailure(e.to_string()))?;
                self.c_state.assign(&new_c);
            }
        }

        Ok(probability)
    }

    fn reset_states(&mut self) {
        self.h_state.fill(0.0);
        self.c_state.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lstm_state_shape_matches_silero_v5() {
        let h = Array2::<f32>::zeros((LSTM_LAYERS, LSTM_HIDDEN));
        assert_eq!(h.shape(), &[2, 64]);
    }
}
