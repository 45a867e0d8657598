//! Component B: the `None | start | end` hysteresis wrapper around a raw
//! per-frame probability stream.

use cascade_vad_core::AudioFrame;

use crate::config::{VADConfig, SILENCE_MARGIN};

/// Samples per millisecond at 16 kHz.
const SAMPLES_PER_MS: u64 = 16;

/// Output of [`VadIterator::process`] for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VadEvent {
    None,
    Start { timestamp_ms: u64, confidence: f32 },
    End { timestamp_ms: u64 },
}

/// Per-frame hysteresis state machine. One instance per stream.
pub struct VadIterator {
    config: VADConfig,
    triggered: bool,
    /// Sample position (not ms) at which the current silence run began,
    /// once one has been observed while `triggered`.
    temp_end_samples: Option<u64>,
}

impl VadIterator {
    pub fn new(config: VADConfig) -> Self {
        Self {
            config,
            triggered: false,
            temp_end_samples: None,
        }
    }

    /// Reset to the just-constructed state — called at processor open and
    /// after `finalize`.
    pub fn reset(&mut self) {
        self.triggered = false;
        self.temp_end_samples = None;
    }

    /// Roll back a speculative `start`: used by the entry guard when a
    /// VAD onset is rejected by the interruption manager.
    pub fn rollback_trigger(&mut self) {
        self.triggered = false;
        self.temp_end_samples = None;
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Feed one `(frame, probability)` pair, advancing the internal
    /// sample cursor by the frame's length.
    pub fn process(&mut self, frame: &AudioFrame, probability: f32) -> VadEvent {
        let current_sample_end = (frame.start_timestamp_ms + cascade_vad_core::FRAME_DURATION_MS) * SAMPLES_PER_MS;

        if probability >= self.config.threshold && !self.triggered {
            self.triggered = true;
            self.temp_end_samples = None;
            let timestamp_ms = frame.start_timestamp_ms.saturating_sub(u64::from(self.config.speech_pad_ms));
            return VadEvent::Start {
                timestamp_ms,
                confidence: probability,
            };
        }

        if probability < (self.config.threshold - SILENCE_MARGIN) && self.triggered {
            let temp_end = *self.temp_end_samples.get_or_insert(current_sample_end);
            let min_silence_samples = u64::from(self.config.min_silence_duration_ms) * SAMPLES_PER_MS;
            if current_sample_end - temp_end >= min_silence_samples {
                self.triggered = false;
                self.temp_end_samples = None;
                let end_ms = temp_end / SAMPLES_PER_MS + u64::from(self.config.speech_pad_ms);
                return VadEvent::End { timestamp_ms: end_ms };
            }
        }

        VadEvent::None
    }
}
