//! # Global runtime configuration.
//!
//! [`Config`] centralizes the tunables shared by the ring buffer and the
//! sink dispatch layer: how much history the ring retains and how long a
//! shutdown waits for sink workers to drain.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use flowvisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.capacity = 4096;
//! cfg.grace = Duration::from_secs(10);
//!
//! assert_eq!(cfg.capacity, 4096);
//! ```

use std::time::Duration;

/// Configuration for the ring buffer and the sink dispatch layer.
#[derive(Clone, Debug)]
pub struct Config {
    /// Historical events the ring retains (0 = follow-only, no history).
    pub capacity: usize,
    /// Maximum time [`SinkSet::shutdown`](crate::SinkSet::shutdown) waits
    /// for sink workers to drain before aborting them.
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `capacity = 0` (follow-only)
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            capacity: 0,
            grace: Duration::from_secs(5),
        }
    }
}
