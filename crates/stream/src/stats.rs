//! Performance counters exposed via [`crate::StreamProcessor::stats`].
//!
//! Monotonic for the lifetime of one processor; reset only at `open`
//! (per spec, the processor itself never persists state across streams).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A point-in-time snapshot, safe to hand to a caller without holding
/// onto the live counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub total_chunks_processed: u64,
    pub average_processing_time_ms: f64,
    pub throughput_chunks_per_second: f64,
    pub speech_segments: u64,
    pub error_rate: f64,
    pub memory_usage_mb: f64,
}

/// Interior-mutable counters updated as the processor runs.
pub struct StreamProcessorStats {
    opened_at: Instant,
    total_chunks_processed: AtomicU64,
    total_processing_time_micros: AtomicU64,
    speech_segments: AtomicU64,
    inference_errors: AtomicU64,
}

impl Default for StreamProcessorStats {
    fn default() -> Self {
        Self {
            opened_at: Instant::now(),
            total_chunks_processed: AtomicU64::new(0),
            total_processing_time_micros: AtomicU64::new(0),
            speech_segments: AtomicU64::new(0),
            inference_errors: AtomicU64::new(0),
        }
    }
}

impl StreamProcessorStats {
    pub fn record_chunk(&self, processing_time_micros: u64) {
        self.total_chunks_processed.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_micros
            .fetch_add(processing_time_micros, Ordering::Relaxed);
    }

    pub fn record_segment(&self) {
        self.speech_segments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inference_error(&self) {
        self.inference_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, pending_bytes: usize) -> StatsSnapshot {
        let total_chunks = self.total_chunks_processed.load(Ordering::Relaxed);
        let total_micros = self.total_processing_time_micros.load(Ordering::Relaxed);
        let errors = self.inference_errors.load(Ordering::Relaxed);
        let elapsed_secs = self.opened_at.elapsed().as_secs_f64().max(f64::EPSILON);

        StatsSnapshot {
            total_chunks_processed: total_chunks,
            average_processing_time_ms: if total_chunks == 0 {
                0.0
            } else {
                (total_micros as f64 / total_chunks as f64) / 1000.0
            },
            throughput_chunks_per_second: total_chunks as f64 / elapsed_secs,
            speech_segments: self.speech_segments.load(Ordering::Relaxed),
            error_rate: if total_chunks == 0 {
                0.0
            } else {
                errors as f64 / total_chunks as f64
            },
            memory_usage_mb: pending_bytes as f64 / (1024.0 * 1024.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_stats_have_zeroed_rates() {
        let stats = StreamProcessorStats::default();
        let snap = stats.snapshot(0);
        assert_eq!(snap.total_chunks_processed, 0);
        assert_eq!(snap.error_rate, 0.0);
    }

    #[test]
    fn error_rate_reflects_recorded_errors() {
        let stats = StreamProcessorStats::default();
        stats.record_chunk(1000);
        stats.record_chunk(1000);
        stats.record_inference_error();
        let snap = stats.snapshot(0);
        assert_eq!(snap.error_rate, 0.5);
    }

    #[test]
    fn average_processing_time_divides_correctly() {
        let stats = StreamProcessorStats::default();
        stats.record_chunk(2000);
        stats.record_chunk(4000);
        let snap = stats.snapshot(0);
        assert_eq!(snap.average_processing_time_ms, 3.0);
    }
}
