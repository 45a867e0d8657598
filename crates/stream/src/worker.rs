//! The dedicated inference worker thread. Owns the [`VoiceInference`]
//! handle exclusively — per spec §5, no lock is needed because only this
//! thread ever touches it.

use cascade_vad_core::{AudioFrame, Result, VoiceInference};
use tokio::sync::mpsc;
use tracing::debug;

/// One `(frame, probability-or-error)` pair, emitted in the same order
/// frames were submitted — the worker processes them serially.
pub type InferenceOutcome = (AudioFrame, Result<f32>);

/// A request posted to the worker thread: either run inference on a frame,
/// or clear any recurrent state (e.g. an RNN's hidden/cell tensors).
enum WorkerRequest {
    Infer(AudioFrame),
    Reset,
}

/// Handle to a running worker thread and its two bounded channels.
pub struct InferenceWorker {
    request_tx: mpsc::Sender<WorkerRequest>,
    result_rx: mpsc::Receiver<InferenceOutcome>,
}

impl InferenceWorker {
    /// Spawn a worker thread owning `inference`, with channel capacity
    /// `capacity` on both the request and result side. Resets the
    /// inference handle before handing it to the thread, so a fresh or
    /// reused handle always starts from clean recurrent state.
    pub fn spawn(mut inference: Box<dyn VoiceInference>, capacity: usize) -> Self {
        inference.reset_states();
        let (request_tx, mut request_rx) = mpsc::channel::<WorkerRequest>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<InferenceOutcome>(capacity);

        std::thread::spawn(move || {
            while let Some(request) = request_rx.blocking_recv() {
                match request {
                    WorkerRequest::Infer(frame) => {
                        let probability = inference.infer(&frame);
                        if result_tx.blocking_send((frame, probability)).is_err() {
                            debug!("inference worker result channel closed, exiting");
                            break;
                        }
                    }
                    WorkerRequest::Reset => inference.reset_states(),
                }
            }
        });

        Self { request_tx, result_rx }
    }

    /// Submit a frame for inference. Suspends (backpressure) if the
    /// channel is full.
    pub async fn submit(&self, frame: AudioFrame) -> bool {
        self.request_tx.send(WorkerRequest::Infer(frame)).await.is_ok()
    }

    /// Await the next `(frame, probability)` result, in FIFO order.
    pub async fn recv(&mut self) -> Option<InferenceOutcome> {
        self.result_rx.recv().await
    }

    /// Post a reset request, ordered after any previously submitted
    /// frames. Called after `finalize` so the next segment's inference
    /// starts from clean recurrent state.
    pub async fn reset(&self) -> bool {
        self.request_tx.send(WorkerRequest::Reset).await.is_ok()
    }

    /// Drop the request sender, signaling the worker thread to exit once
    /// it drains any in-flight frame, then drain any results already in
    /// flight so they are not silently lost mid-cancellation.
    pub async fn shutdown(mut self) {
        drop(self.request_tx);
        while self.result_rx.recv().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_vad_core::{EnergyInference, FRAME_SAMPLES};

    #[tokio::test]
    async fn submitted_frame_returns_a_result() {
        let mut worker = InferenceWorker::spawn(Box::new(EnergyInference::default()), 4);
        let frame = AudioFrame::new([0.9; FRAME_SAMPLES], 0);
        assert!(worker.submit(frame).await);
        let (_, probability) = worker.recv().await.unwrap();
        assert_eq!(probability.unwrap(), 1.0);
    }

    #[tokio::test]
    async fn results_preserve_submission_order() {
        let mut worker = InferenceWorker::spawn(Box::new(EnergyInference::default()), 8);
        for i in 0..5u64 {
            worker.submit(AudioFrame::new([0.9; FRAME_SAMPLES], i * 32)).await;
        }
        for expected_ts in (0..5u64).map(|i| i * 32) {
            let (frame, _) = worker.recv().await.unwrap();
            assert_eq!(frame.start_timestamp_ms, expected_ts);
        }
    }

    #[tokio::test]
    async fn shutdown_drains_in_flight_results() {
        let mut worker = InferenceWorker::spawn(Box::new(EnergyInference::default()), 8);
        worker.submit(AudioFrame::new([0.9; FRAME_SAMPLES], 0)).await;
        worker.shutdown().await;
    }
}
