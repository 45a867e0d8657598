//! Shared primitives for the cascade VAD engine: frame/buffer types, the
//! inference seam, and the error taxonomy every other crate builds on.

pub mod audio;
pub mod buffer;
pub mod error;
pub mod inference;

pub use audio::{
    pcm16le_to_f32, pcm32fle_to_f32, AudioFrame, SampleFormat, FRAME_DURATION_MS, FRAME_SAMPLES,
    PCM16_NORMALIZE, SAMPLE_RATE_HZ,
};
pub use buffer::FrameAlignedBuffer;
pub use error::{Error, Result};
pub use inference::{frame_energy_db, EnergyInference, VoiceInference};
