//! Component F and its supporting pieces: the per-connection
//! `StreamProcessor`, its performance counters, and the dedicated
//! inference worker thread.

mod processor;
mod stats;
mod worker;

pub use processor::{AudioChunk, StreamProcessor, StreamProcessorConfig};
pub use stats::StatsSnapshot;
pub use worker::{InferenceOutcome, InferenceWorker};
