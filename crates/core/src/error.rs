//! Error taxonomy shared by every crate in the cascade VAD engine.

use thiserror::Error;

/// Errors a caller of the engine can observe.
///
/// Cancellation is deliberately absent: closing a stream early is normal
/// shutdown, not a failure, and is modeled by the result stream simply
/// ending rather than by a variant here.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input handed to `FrameAlignedBuffer::append` or similar:
    /// wrong byte alignment for the declared sample format, empty buffer
    /// where samples were required, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The inference collaborator failed to produce a probability for a
    /// frame (backend error, shape mismatch, state corruption).
    #[error("inference failed: {0}")]
    InferenceFailure(String),

    /// A component observed its invariants violated by a caller or by
    /// another component — e.g. a frame arriving out of timestamp order.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// A caller used a component outside its documented lifecycle, e.g.
    /// calling `append` after `finalize` but before `close`.
    #[error("lifecycle misuse: {0}")]
    LifecycleMisuse(String),
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;
