//! Component F: owns one instance of A-E plus the inference worker and
//! exposes the async input/output surface.

use std::time::Instant;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{info, warn};

use cascade_vad_core::{
    frame_energy_db, AudioFrame, Error, FrameAlignedBuffer, Result, SampleFormat, VoiceInference,
    SAMPLE_RATE_HZ,
};
use cascade_vad_engine::{CascadeResult, VADConfig, VadStateMachine};
use cascade_vad_interrupt::{InterruptionConfig, InterruptionManager, SystemState};

use crate::stats::{StatsSnapshot, StreamProcessorStats};
use crate::worker::InferenceWorker;

/// One chunk of raw audio bytes plus the format it's encoded in.
pub type AudioChunk = (Vec<u8>, SampleFormat);

/// Configuration bundle for [`StreamProcessor::open`].
#[derive(Debug, Clone, Copy)]
pub struct StreamProcessorConfig {
    pub vad: VADConfig,
    pub interruption: InterruptionConfig,
    /// Capacity of both inference channels. Kept small so backpressure
    /// surfaces early (spec recommends ~8).
    pub channel_capacity: usize,
    /// Below this energy, skip the inference call entirely and treat the
    /// frame as `probability = 0.0`. `None` disables the gate. Never
    /// changes B/D's event semantics, only whether the neural model runs.
    pub energy_gate_db: Option<f32>,
}

impl Default for StreamProcessorConfig {
    fn default() -> Self {
        Self {
            vad: VADConfig::default(),
            interruption: InterruptionConfig::default(),
            channel_capacity: 8,
            energy_gate_db: Some(-50.0),
        }
    }
}

/// Owns one buffer, one state machine, and one inference worker, for the
/// duration of exactly one logical audio stream.
pub struct StreamProcessor {
    buffer: FrameAlignedBuffer,
    state_machine: VadStateMachine,
    worker: Option<InferenceWorker>,
    stats: StreamProcessorStats,
    energy_gate_db: Option<f32>,
    closed: bool,
    last_close_result: Option<CascadeResult>,
}

impl StreamProcessor {
    /// Open a new processor. `inference`'s recurrent state is reset as
    /// part of spawning the worker, so callers may hand in a reused handle.
    pub fn open(config: StreamProcessorConfig, inference: Box<dyn VoiceInference>) -> Self {
        let worker = InferenceWorker::spawn(inference, config.channel_capacity);
        let interruption = InterruptionManager::new(config.interruption);
        let state_machine = VadStateMachine::new(config.vad, interruption);
        info!(capacity = config.channel_capacity, "stream processor opened");
        Self {
            buffer: FrameAlignedBuffer::new(),
            state_machine,
            worker: Some(worker),
            stats: StreamProcessorStats::default(),
            energy_gate_db: config.energy_gate_db,
            closed: false,
            last_close_result: None,
        }
    }

    /// Delegate to the interruption manager's switch guard.
    pub fn set_system_state(&self, state: SystemState) -> bool {
        self.state_machine.interruption_manager().request_state(state)
    }

    /// Read-only snapshot of the dialogue state the entry/switch guards
    /// currently hold.
    pub fn system_state(&self) -> SystemState {
        self.state_machine.interruption_manager().get_state()
    }

    /// Current performance counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.buffer.pending_samples() * std::mem::size_of::<f32>())
    }

    /// Consume a stream of raw audio chunks, producing a stream of
    /// results in strict input-time order. Ends the input stream's
    /// lifecycle with the same flush+finalize+close sequence as calling
    /// [`StreamProcessor::close`] directly.
    pub fn process_stream<'a, S>(&'a mut self, mut input: S) -> impl Stream<Item = Result<CascadeResult>> + 'a
    where
        S: Stream<Item = AudioChunk> + Unpin + Send + 'a,
    {
        try_stream! {
            while let Some((bytes, format)) = input.next().await {
                if let Err(e) = self.buffer.append(&bytes, format) {
                    warn!(error = %e, "dropping malformed chunk");
                    continue;
                }

                while let Some(frame) = self.buffer.pop_frame() {
                    if let Some(result) = self.run_frame(frame).await? {
                        if matches!(result, CascadeResult::Segment { .. }) {
                            self.stats.record_segment();
                        }
                        yield result;
                    }
                }
            }

            if let Some(result) = self.close().await {
                yield result;
            }
        }
    }

    /// Convenience over `process_stream`: reads raw PCM bytes from a file
    /// path in fixed-size chunks and drives the same pipeline. Does not
    /// decode any container format — `path` must contain raw samples in
    /// `format`.
    pub fn process_file<'a>(
        &'a mut self,
        path: impl AsRef<std::path::Path> + 'a,
        format: SampleFormat,
    ) -> impl Stream<Item = Result<CascadeResult>> + 'a {
        const READ_CHUNK_BYTES: usize = 4096;
        let path = path.as_ref().to_path_buf();

        try_stream! {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|e| Error::InvalidInput(format!("cannot open {}: {e}", path.display())))?;
            let mut reader = BufReader::new(file);
            let mut buf = vec![0u8; READ_CHUNK_BYTES];

            loop {
                let n = reader
                    .read(&mut buf)
                    .await
                    .map_err(|e| Error::InvalidInput(e.to_string()))?;
                if n == 0 {
                    break;
                }
                if let Err(e) = self.buffer.append(&buf[..n], format) {
                    warn!(error = %e, "dropping malformed chunk");
                    continue;
                }
                while let Some(frame) = self.buffer.pop_frame() {
                    if let Some(result) = self.run_frame(frame).await? {
                        if matches!(result, CascadeResult::Segment { .. }) {
                            self.stats.record_segment();
                        }
                        yield result;
                    }
                }
            }
            if let Some(result) = self.close().await {
                yield result;
            }
        }
    }

    /// Submit one frame to the worker, await its probability, and feed
    /// the state machine. `InferenceFailure` is recoverable: the frame is
    /// treated as `probability = 0.0` and an error counter is bumped.
    ///
    /// Frames quiet enough to fall below `energy_gate_db` skip the worker
    /// entirely and are scored `0.0` directly — same effect a genuine
    /// inference call would have on silence, at a fraction of the cost.
    async fn run_frame(&mut self, frame: AudioFrame) -> Result<Option<CascadeResult>> {
        if let Some(floor) = self.energy_gate_db {
            if frame_energy_db(&frame) < floor {
                self.stats.record_chunk(0);
                return Ok(self.state_machine.process_frame(frame, 0.0));
            }
        }

        let worker = self
            .worker
            .as_ref()
            .ok_or_else(|| Error::LifecycleMisuse("process_frame called after close".into()))?;

        let started = Instant::now();
        if !worker.submit(frame.clone()).await {
            return Err(Error::StateViolation("inference worker channel closed unexpectedly".into()));
        }
        let worker = self.worker.as_mut().expect("checked above");
        let (frame, probability) = worker
            .recv()
            .await
            .ok_or_else(|| Error::StateViolation("inference worker closed unexpectedly".into()))?;

        let probability = match probability {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "inference failed, treating frame as silence");
                self.stats.record_inference_error();
                0.0
            }
        };
        self.stats.record_chunk(started.elapsed().as_micros() as u64);

        Ok(self.state_machine.process_frame(frame, probability))
    }

    /// Cancel any pending input wait, drain in-flight inference (the
    /// worker's output channel is simply dropped), flush a trailing
    /// partial frame and any in-progress segment, then release the
    /// worker. Idempotent: a second call returns the same outcome as the
    /// first without re-running the flush.
    pub async fn close(&mut self) -> Option<CascadeResult> {
        if self.closed {
            return self.last_close_result.clone();
        }
        self.closed = true;

        let flushed = self.buffer.flush();
        let mut trailing = None;
        if let Some(frame) = flushed {
            trailing = self.run_frame(frame).await.unwrap_or_else(|e| {
                warn!(error = %e, "error flushing final frame at close");
                None
            });
        }

        if trailing.is_none() {
            let current_ts = self.buffer.total_samples_consumed() * 1000 / u64::from(SAMPLE_RATE_HZ);
            trailing = self.state_machine.finalize(current_ts);
        }

        if let Some(worker) = self.worker.as_ref() {
            worker.reset().await;
        }
        if let Some(worker) = self.worker.take() {
            worker.shutdown().await;
        }

        info!("stream processor closed");
        self.last_close_result = trailing.clone();
        trailing
    }
}
