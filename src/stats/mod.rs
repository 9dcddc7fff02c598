//! Statistics and termination tracking.
//!
//! [`Tracker`] owns the generation/evaluation counters, a pausable
//! [`Stopwatch`] and the optional run log, and decides when a run stops.

mod log;
mod stopwatch;
mod tracker;

pub use log::{LogEntry, LogValues};
pub use stopwatch::Stopwatch;
pub use tracker::{AlgorithmState, GenerationOutcome, Limits, LoopState, StopReason, Tracker};
