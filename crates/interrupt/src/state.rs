//! Dialogue-layer state, owned exclusively by [`crate::InterruptionManager`].

use serde::{Deserialize, Serialize};

/// The caller's notion of conversational phase.
///
/// `Collecting` is entered only by the VAD state machine on an accepted
/// speech onset, and left only when it emits `end` — external callers can
/// never request it directly (see [`crate::InterruptionManager::request_state`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemState {
    Idle,
    Collecting,
    Processing,
    Responding,
}

impl SystemState {
    /// Whether an external `request_state` call is allowed to leave this
    /// state for `target` — the switch guard's transition table.
    pub(crate) fn allows_external_transition_to(self, target: SystemState) -> bool {
        use SystemState::*;
        match (self, target) {
            (Idle, Processing) => true,
            (Processing, Responding) => true,
            (Processing, Idle) | (Responding, Idle) => true,
            _ => false,
        }
    }
}

/// Onset-while-busy notification emitted by the state machine when a
/// speech onset arrives while the dialogue layer claims to be busy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterruptionEvent {
    pub timestamp_ms: u64,
    /// The dialogue state that was interrupted — always `Processing` or
    /// `Responding`, never `Idle` or `Collecting`.
    pub interrupted_state: SystemState,
    /// The raw speech probability that crossed the onset threshold.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_to_processing_allowed() {
        assert!(SystemState::Idle.allows_external_transition_to(SystemState::Processing));
    }

    #[test]
    fn processing_to_responding_allowed() {
        assert!(SystemState::Processing.allows_external_transition_to(SystemState::Responding));
    }

    #[test]
    fn any_to_idle_allowed_except_collecting() {
        assert!(SystemState::Processing.allows_external_transition_to(SystemState::Idle));
        assert!(SystemState::Responding.allows_external_transition_to(SystemState::Idle));
    }

    #[test]
    fn collecting_never_allows_external_transition() {
        assert!(!SystemState::Collecting.allows_external_transition_to(SystemState::Idle));
        assert!(!SystemState::Collecting.allows_external_transition_to(SystemState::Processing));
    }

    #[test]
    fn idle_to_responding_disallowed() {
        assert!(!SystemState::Idle.allows_external_transition_to(SystemState::Responding));
    }
}
