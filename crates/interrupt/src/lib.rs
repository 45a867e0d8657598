//! Dialogue-layer state and the guard protocol that keeps it mutually
//! exclusive with the VAD layer's notion of "user is currently speaking".

pub mod config;
pub mod manager;
pub mod state;

pub use config::InterruptionConfig;
pub use manager::{Decision, InterruptionManager};
pub use state::{InterruptionEvent, SystemState};
