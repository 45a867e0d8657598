//! Component D: the orchestrator. Wires B (hysteresis), C (segment
//! collection) and E (the interruption guards) into a single
//! `process_frame` call that yields at most one [`CascadeResult`].

use cascade_vad_core::AudioFrame;
use cascade_vad_interrupt::{Decision, InterruptionEvent, InterruptionManager};

use crate::config::VADConfig;
use crate::segment::{SegmentCollector, SpeechSegment};
use crate::vad_iterator::{VadEvent, VadIterator};

/// Exactly one variant per emitted result, in strict input-time order.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeResult {
    /// No speech at this frame.
    Frame { frame: AudioFrame, timestamp_ms: u64 },
    /// A completed speech span.
    Segment { segment: SpeechSegment },
    /// An onset-while-busy notification.
    Interruption { event: InterruptionEvent },
}

/// Orchestrates B + C + E for one stream.
pub struct VadStateMachine {
    vad_iterator: VadIterator,
    collector: SegmentCollector,
    interruption: InterruptionManager,
}

impl VadStateMachine {
    pub fn new(vad_config: VADConfig, interruption: InterruptionManager) -> Self {
        Self {
            vad_iterator: VadIterator::new(vad_config),
            collector: SegmentCollector::new(),
            interruption,
        }
    }

    /// Read-only access to the dialogue state E currently holds.
    pub fn interruption_manager(&self) -> &InterruptionManager {
        &self.interruption
    }

    /// Process one `(frame, probability)` pair, consuming `frame`.
    ///
    /// Panics only on a `SegmentCollectorError`, which indicates B produced
    /// an ill-formed event sequence — an invariant bug, per spec §7
    /// `StateViolation`, surfaced to the caller via `cascade_vad_core::Error`
    /// at the `StreamProcessor` layer rather than here.
    pub fn process_frame(&mut self, frame: AudioFrame, probability: f32) -> Option<CascadeResult> {
        let event = self.vad_iterator.process(&frame, probability);

        match event {
            VadEvent::Start { timestamp_ms, confidence } => {
                match self.interruption.on_speech_onset(timestamp_ms, confidence) {
                    Decision::Reject => {
                        self.vad_iterator.rollback_trigger();
                        Some(CascadeResult::Frame {
                            timestamp_ms: frame.start_timestamp_ms,
                            frame,
                        })
                    }
                    Decision::Interrupt(prior_state) => {
                        self.collector
                            .on_start(timestamp_ms)
                            .expect("entry guard accepted onset while collector already collecting");
                        self.collector.on_frame(&frame);
                        let event = self.interruption.interruption_event(timestamp_ms, prior_state, confidence);
                        Some(CascadeResult::Interruption { event })
                    }
                    Decision::Accept => {
                        self.collector
                            .on_start(timestamp_ms)
                            .expect("entry guard accepted onset while collector already collecting");
                        self.collector.on_frame(&frame);
                        None
                    }
                }
            }
            VadEvent::End { timestamp_ms } => {
                self.collector.on_frame(&frame);
                let segment = self
                    .collector
                    .on_end(timestamp_ms)
                    .expect("B emitted end without a prior accepted start");
                self.interruption.on_speech_offset();
                Some(CascadeResult::Segment { segment })
            }
            VadEvent::None => {
                if self.collector.is_collecting() {
                    self.collector.on_frame(&frame);
                    None
                } else {
                    Some(CascadeResult::Frame {
                        timestamp_ms: frame.start_timestamp_ms,
                        frame,
                    })
                }
            }
        }
    }

    /// Flush any in-progress segment as if an `end` had arrived at
    /// `current_timestamp_ms`, then reset B for the next (non-existent,
    /// since a stream ends here) onset.
    pub fn finalize(&mut self, current_timestamp_ms: u64) -> Option<CascadeResult> {
        let result = if self.collector.is_collecting() {
            let segment = self
                .collector
                .on_end(current_timestamp_ms)
                .expect("collector reported collecting but on_end failed");
            self.interruption.on_speech_offset();
            Some(CascadeResult::Segment { segment })
        } else {
            None
        };
        self.vad_iterator.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_vad_core::FRAME_SAMPLES;
    use cascade_vad_interrupt::{InterruptionConfig, SystemState};

    fn machine(cfg: VADConfig, icfg: InterruptionConfig) -> VadStateMachine {
        VadStateMachine::new(cfg, InterruptionManager::new(icfg))
    }

    fn frame(start_ms: u64, amplitude: f32) -> AudioFrame {
        AudioFrame::new([amplitude; FRAME_SAMPLES], start_ms)
    }

    #[test]
    fn silence_yields_frame_results() {
        let mut m = machine(VADConfig::default(), InterruptionConfig::default());
        let result = m.process_frame(frame(0, 0.0), 0.0);
        assert!(matches!(result, Some(CascadeResult::Frame { timestamp_ms: 0, .. })));
    }

    #[test]
    fn accepted_onset_produces_no_result_until_end() {
        let mut m = machine(
            VADConfig { speech_pad_ms: 0, min_silence_duration_ms: 32, ..VADConfig::default() },
            InterruptionConfig::default(),
        );
        assert_eq!(m.process_frame(frame(0, 0.9), 0.9), None);
        assert_eq!(m.process_frame(frame(32, 0.0), 0.1), None);
        let result = m.process_frame(frame(64, 0.0), 0.1);
        assert!(matches!(result, Some(CascadeResult::Segment { .. })));
    }

    #[test]
    fn onset_while_responding_emits_interruption() {
        let mut m = machine(
            VADConfig { speech_pad_ms: 0, ..VADConfig::default() },
            InterruptionConfig::default(),
        );
        assert!(m.interruption_manager().request_state(SystemState::Processing));
        assert!(m.interruption_manager().request_state(SystemState::Responding));
        let result = m.process_frame(frame(0, 0.9), 0.9);
        match result {
            Some(CascadeResult::Interruption { event }) => {
                assert_eq!(event.interrupted_state, SystemState::Responding);
            }
            other => panic!("expected Interruption, got {other:?}"),
        }
    }

    #[test]
    fn rejected_onset_rolls_back_and_emits_frame() {
        let mut m = machine(
            VADConfig { speech_pad_ms: 0, min_silence_duration_ms: 32, ..VADConfig::default() },
            InterruptionConfig { enabled: true, min_interval_ms: 1000 },
        );
        assert_eq!(m.process_frame(frame(0, 0.9), 0.9), None);
        assert_eq!(m.process_frame(frame(32, 0.0), 0.1), None);
        assert!(matches!(
            m.process_frame(frame(64, 0.0), 0.1),
            Some(CascadeResult::Segment { .. })
        ));
        // a fresh onset arriving inside min_interval_ms of the first is rejected
        let result = m.process_frame(frame(96, 0.9), 0.9);
        assert!(matches!(result, Some(CascadeResult::Frame { .. })));
        assert!(!m.vad_iterator.is_triggered());
    }

    #[test]
    fn finalize_flushes_in_progress_segment() {
        let mut m = machine(
            VADConfig { speech_pad_ms: 0, ..VADConfig::default() },
            InterruptionConfig::default(),
        );
        assert_eq!(m.process_frame(frame(0, 0.9), 0.9), None);
        let result = m.finalize(32);
        assert!(matches!(result, Some(CascadeResult::Segment { .. })));
    }

    #[test]
    fn finalize_with_no_active_segment_returns_none() {
        let mut m = machine(VADConfig::default(), InterruptionConfig::default());
        assert_eq!(m.finalize(0), None);
    }
}
