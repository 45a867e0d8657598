//! The two guards that keep dialogue-layer and VAD-layer state mutually
//! exclusive: the entry guard ([`InterruptionManager::on_speech_onset`])
//! and the switch guard ([`InterruptionManager::request_state`]).

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::InterruptionConfig;
use crate::state::{InterruptionEvent, SystemState};

/// Outcome of an onset arriving at the entry guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Onset admitted; system moves to `Collecting`, no interruption fired.
    Accept,
    /// Onset admitted while the dialogue layer was busy; system moves to
    /// `Collecting` and an [`InterruptionEvent`] should be emitted.
    Interrupt(SystemState),
    /// Onset refused; caller must roll back any speculative state.
    Reject,
}

struct Mutable {
    current_state: SystemState,
    last_onset_ts_ms: Option<u64>,
}

/// Holds the dialogue state and arbitrates both guards.
///
/// Per the concurrency model, a single `InterruptionManager` is touched
/// only by its owning `StreamProcessor`'s main task — the lock here
/// exists for interior mutability under a shared reference, not because
/// multiple threads contend on it.
pub struct InterruptionManager {
    config: InterruptionConfig,
    mutable: Mutex<Mutable>,
}

impl InterruptionManager {
    pub fn new(config: InterruptionConfig) -> Self {
        Self {
            config,
            mutable: Mutex::new(Mutable {
                current_state: SystemState::Idle,
                last_onset_ts_ms: None,
            }),
        }
    }

    /// The entry guard. Called by the VAD state machine on every `start`
    /// event before it is allowed to take effect.
    pub fn on_speech_onset(&self, ts_ms: u64, confidence: f32) -> Decision {
        let mut m = self.mutable.lock();

        if !self.config.enabled {
            return if m.current_state == SystemState::Collecting {
                Decision::Reject
            } else {
                m.current_state = SystemState::Collecting;
                Decision::Accept
            };
        }

        if let Some(last) = m.last_onset_ts_ms {
            if ts_ms.saturating_sub(last) < u64::from(self.config.min_interval_ms) {
                debug!(ts_ms, last, "onset rejected: inside min_interval_ms");
                return Decision::Reject;
            }
        }
        m.last_onset_ts_ms = Some(ts_ms);

        match m.current_state {
            SystemState::Processing | SystemState::Responding => {
                let prior = m.current_state;
                m.current_state = SystemState::Collecting;
                info!(ts_ms, ?prior, "speech onset interrupts dialogue state");
                Decision::Interrupt(prior)
            }
            SystemState::Idle => {
                m.current_state = SystemState::Collecting;
                Decision::Accept
            }
            SystemState::Collecting => Decision::Reject,
        }
    }

    /// Build the [`InterruptionEvent`] for a `Decision::Interrupt` outcome.
    pub fn interruption_event(
        &self,
        ts_ms: u64,
        interrupted_state: SystemState,
        confidence: f32,
    ) -> InterruptionEvent {
        InterruptionEvent {
            timestamp_ms: ts_ms,
            interrupted_state,
            confidence,
        }
    }

    /// Called by the VAD state machine on `end`: returns the dialogue
    /// layer to `Idle`.
    pub fn on_speech_offset(&self) {
        self.mutable.lock().current_state = SystemState::Idle;
    }

    /// The switch guard. Returns `false` without effect if currently
    /// `Collecting`, or if `new_state` is not a valid target from the
    /// current state.
    pub fn request_state(&self, new_state: SystemState) -> bool {
        let mut m = self.mutable.lock();
        if m.current_state == SystemState::Collecting {
            return false;
        }
        if !m.current_state.allows_external_transition_to(new_state) {
            return false;
        }
        m.current_state = new_state;
        true
    }

    /// Read-only snapshot of the current dialogue state.
    pub fn get_state(&self) -> SystemState {
        self.mutable.lock().current_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(enabled: bool, min_interval_ms: u32) -> InterruptionManager {
        InterruptionManager::new(InterruptionConfig {
            enabled,
            min_interval_ms,
        })
    }

    #[test]
    fn idle_onset_is_accepted_and_moves_to_collecting() {
        let m = manager(true, 500);
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
        assert_eq!(m.get_state(), SystemState::Collecting);
    }

    #[test]
    fn onset_while_processing_is_an_interruption() {
        let m = manager(true, 500);
        assert!(m.request_state(SystemState::Processing));
        assert_eq!(
            m.on_speech_onset(0, 0.9),
            Decision::Interrupt(SystemState::Processing)
        );
        assert_eq!(m.get_state(), SystemState::Collecting);
    }

    #[test]
    fn onset_while_responding_is_an_interruption() {
        let m = manager(true, 500);
        assert!(m.request_state(SystemState::Processing));
        assert!(m.request_state(SystemState::Responding));
        assert_eq!(
            m.on_speech_onset(0, 0.9),
            Decision::Interrupt(SystemState::Responding)
        );
    }

    #[test]
    fn rapid_double_onset_rejected_under_min_interval() {
        let m = manager(true, 500);
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
        m.on_speech_offset();
        assert_eq!(m.on_speech_onset(200, 0.9), Decision::Reject);
    }

    #[test]
    fn onset_after_min_interval_elapses_is_accepted() {
        let m = manager(true, 500);
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
        m.on_speech_offset();
        assert_eq!(m.on_speech_onset(500, 0.9), Decision::Accept);
    }

    #[test]
    fn double_onset_while_collecting_is_rejected() {
        let m = manager(true, 0);
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
        assert_eq!(m.on_speech_onset(1, 0.9), Decision::Reject);
    }

    #[test]
    fn state_theft_attempt_while_collecting_fails() {
        let m = manager(true, 500);
        m.on_speech_onset(0, 0.9);
        assert!(!m.request_state(SystemState::Processing));
        assert_eq!(m.get_state(), SystemState::Collecting);
    }

    #[test]
    fn offset_returns_to_idle() {
        let m = manager(true, 500);
        m.on_speech_onset(0, 0.9);
        m.on_speech_offset();
        assert_eq!(m.get_state(), SystemState::Idle);
    }

    #[test]
    fn disabled_manager_still_rejects_double_collecting() {
        let m = manager(false, 500);
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
        assert_eq!(m.on_speech_onset(1, 0.9), Decision::Reject);
    }

    #[test]
    fn disabled_manager_never_elevates_to_interrupt() {
        let m = manager(false, 500);
        assert!(m.request_state(SystemState::Processing));
        assert_eq!(m.on_speech_onset(0, 0.9), Decision::Accept);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let m = manager(true, 500);
        assert!(!m.request_state(SystemState::Responding));
    }
}
