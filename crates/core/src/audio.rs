//! Audio frame types and sample-format conversion
//!
//! An [`AudioFrame`] is the model's fixed-size inference unit: 512 samples
//! of 32-bit float PCM at 16 kHz mono. Frames are value types — once built
//! they never mutate, so callers can stash them in a `CascadeResult` or an
//! in-progress speech segment accumulator without worrying about aliasing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Model input size in samples. Design constant: a different sample rate
/// would require a different frame size, not a different constant here.
pub const FRAME_SAMPLES: usize = 512;

/// The only sample rate this engine supports end to end.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Wall-clock span of one frame at [`SAMPLE_RATE_HZ`], in milliseconds.
/// `512 * 1000 / 16000 = 32`.
pub const FRAME_DURATION_MS: u64 = (FRAME_SAMPLES as u64 * 1000) / SAMPLE_RATE_HZ as u64;

/// Wire formats accepted by [`crate::FrameAlignedBuffer::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 16-bit signed PCM, little-endian.
    PcmS16Le,
    /// 32-bit float PCM, little-endian (native f32 byte layout).
    PcmF32Le,
}

impl SampleFormat {
    /// Byte width of a single sample in this format.
    pub fn sample_bytes(self) -> usize {
        match self {
            SampleFormat::PcmS16Le => 2,
            SampleFormat::PcmF32Le => 4,
        }
    }
}

/// Scale used to convert a signed 16-bit PCM sample into `[-1.0, 1.0]` f32.
pub const PCM16_NORMALIZE: f32 = 32768.0;

/// A fixed 512-sample, 16 kHz mono inference frame with exact time bookkeeping.
///
/// `start_timestamp_ms` is the position of sample 0 of this frame in the
/// logical input stream, derived from sample counts — never accumulated as
/// floating point.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Arc<[f32; FRAME_SAMPLES]>,
    /// Position of sample 0 in the logical input stream, in milliseconds.
    pub start_timestamp_ms: u64,
}

impl AudioFrame {
    /// Build a frame from exactly [`FRAME_SAMPLES`] f32 samples.
    pub fn new(samples: [f32; FRAME_SAMPLES], start_timestamp_ms: u64) -> Self {
        Self {
            samples: Arc::new(samples),
            start_timestamp_ms,
        }
    }

    /// Borrow the samples as a fixed-size array, the shape the inference
    /// collaborator's `infer` contract expects.
    pub fn samples(&self) -> &[f32; FRAME_SAMPLES] {
        &self.samples
    }

    /// Samples as a slice, for callers that only need contiguous f32 audio
    /// (e.g. appending this frame's content into a speech segment
    /// accumulator upstream).
    pub fn as_slice(&self) -> &[f32] {
        self.samples.as_slice()
    }

    /// Timestamp, in ms, one sample past the end of this frame — i.e. the
    /// start timestamp of the next frame in a contiguous stream.
    pub fn end_timestamp_ms(&self) -> u64 {
        self.start_timestamp_ms + FRAME_DURATION_MS
    }
}

/// Convert raw little-endian PCM16 bytes to f32 samples in `[-1.0, 1.0]`.
///
/// `bytes.len()` must be a multiple of 2; callers are expected to have
/// already validated this (see [`crate::Error::InvalidInput`]).
pub fn pcm16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / PCM16_NORMALIZE)
        .collect()
}

/// Reinterpret raw little-endian PCM32F bytes as f32 samples.
///
/// `bytes.len()` must be a multiple of 4.
pub fn pcm32fle_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
