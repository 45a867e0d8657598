//! Configuration for [`crate::InterruptionManager`].

use serde::{Deserialize, Serialize};

/// Policy knobs for the entry guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InterruptionConfig {
    /// When `false`, every onset is accepted unless the system is already
    /// `Collecting` (double-start guard still applies).
    pub enabled: bool,
    /// Minimum gap between two accepted onsets. A second onset arriving
    /// sooner is rejected and does not update `last_onset_ts_ms`.
    pub min_interval_ms: u32,
}

impl Default for InterruptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_ms: 500,
        }
    }
}
