//! # Error types for the sink dispatch layer.
//!
//! The ring buffer itself is infallible by design: it is in-memory and
//! lossy, so a slow consumer surfaces as counters and cancellation
//! surfaces as channel close, never as an error. What can fail is sink
//! management, and [`DispatchError`] covers it.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by [`SinkSet`](crate::SinkSet).
///
/// These represent failures in managing attached sinks, not in event
/// delivery.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Attempted to attach a sink under a name that is already registered.
    #[error("sink '{name}' already attached")]
    SinkAlreadyExists {
        /// The duplicate sink name.
        name: String,
    },
    /// Attempted to detach a sink that is not registered.
    #[error("sink '{name}' not found")]
    SinkNotFound {
        /// The missing sink name.
        name: String,
    },
    /// Shutdown grace period was exceeded; the listed sink workers were
    /// still running and had to be aborted.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the sink workers that did not drain in time.
        stuck: Vec<String>,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::SinkAlreadyExists { .. } => "dispatch_sink_already_exists",
            DispatchError::SinkNotFound { .. } => "dispatch_sink_not_found",
            DispatchError::GraceExceeded { .. } => "dispatch_grace_exceeded",
        }
    }
}
