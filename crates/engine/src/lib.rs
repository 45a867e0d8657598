//! The VAD cascade: hysteresis (B), segment collection (C), and the
//! orchestrating state machine (D) that also arbitrates the interruption
//! guards from `cascade-vad-interrupt` (E).

pub mod config;
pub mod segment;
pub mod state_machine;
pub mod vad_iterator;

#[cfg(feature = "onnx")]
pub mod onnx_silero;

pub use config::{VADConfig, SILENCE_MARGIN};
pub use segment::{SegmentCollector, SegmentCollectorError, SpeechSegment};
pub use state_machine::{CascadeResult, VadStateMachine};
pub use vad_iterator::{VadEvent, VadIterator};

#[cfg(feature = "onnx")]
pub use onnx_silero::OnnxSileroInference;
