//! Component C: concatenates frames between `start` and `end` into a
//! [`SpeechSegment`], including the padding window B already accounted
//! for in its emitted timestamps.

use cascade_vad_core::AudioFrame;

/// A contiguous run of speech audio, boundary-inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSegment {
    pub start_timestamp_ms: u64,
    pub end_timestamp_ms: u64,
    /// Raw samples, in the same format frames carry: f32 PCM.
    pub audio: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Collecting,
}

/// Fatal: B produced an ill-formed event sequence (`end` while idle, or
/// `start` while already collecting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SegmentCollectorError {
    #[error("on_start called while already collecting a segment")]
    AlreadyCollecting,
    #[error("on_end called while not collecting a segment")]
    NotCollecting,
}

/// Accumulates frames into a [`SpeechSegment`] between `on_start`/`on_end`.
pub struct SegmentCollector {
    state: State,
    start_timestamp_ms: u64,
    audio: Vec<f32>,
}

impl Default for SegmentCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentCollector {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            start_timestamp_ms: 0,
            audio: Vec::new(),
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.state == State::Collecting
    }

    /// Transition `idle -> collecting`, opening a new segment.
    pub fn on_start(&mut self, timestamp_ms: u64) -> Result<(), SegmentCollectorError> {
        if self.state == State::Collecting {
            return Err(SegmentCollectorError::AlreadyCollecting);
        }
        self.state = State::Collecting;
        self.start_timestamp_ms = timestamp_ms;
        self.audio.clear();
        Ok(())
    }

    /// While `collecting`, append a frame's samples.
    pub fn on_frame(&mut self, frame: &AudioFrame) {
        if self.state == State::Collecting {
            self.audio.extend_from_slice(frame.as_slice());
        }
    }

    /// Transition `collecting -> idle`, finalizing and returning the segment.
    pub fn on_end(&mut self, timestamp_ms: u64) -> Result<SpeechSegment, SegmentCollectorError> {
        if self.state != State::Collecting {
            return Err(SegmentCollectorError::NotCollecting);
        }
        self.state = State::Idle;
        Ok(SpeechSegment {
            start_timestamp_ms: self.start_timestamp_ms,
            end_timestamp_ms: timestamp_ms,
            audio: std::mem::take(&mut self.audio),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_vad_core::FRAME_SAMPLES;

    #[test]
    fn on_start_then_frames_then_end_yields_segment() {
        let mut c = SegmentCollector::new();
        c.on_start(0).unwrap();
        c.on_frame(&AudioFrame::new([0.5; FRAME_SAMPLES], 0));
        let seg = c.on_end(32).unwrap();
        assert_eq!(seg.start_timestamp_ms, 0);
        assert_eq!(seg.end_timestamp_ms, 32);
        assert_eq!(seg.audio.len(), FRAME_SAMPLES);
    }

    #[test]
    fn on_end_while_idle_is_an_error() {
        let mut c = SegmentCollector::new();
        assert_eq!(c.on_end(0).unwrap_err(), SegmentCollectorError::NotCollecting);
    }

    #[test]
    fn on_start_while_collecting_is_an_error() {
        let mut c = SegmentCollector::new();
        c.on_start(0).unwrap();
        assert_eq!(c.on_start(32).unwrap_err(), SegmentCollectorError::AlreadyCollecting);
    }

    #[test]
    fn frames_outside_collecting_are_dropped() {
        let mut c = SegmentCollector::new();
        c.on_frame(&AudioFrame::new([0.5; FRAME_SAMPLES], 0));
        c.on_start(0).unwrap();
        let seg = c.on_end(0).unwrap();
        assert!(seg.audio.is_empty());
    }
}
