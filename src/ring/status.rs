//! # Point-in-time ring status.

use std::time::SystemTime;

/// Snapshot of a ring buffer's state, taken under the shared lock.
///
/// Two consecutive calls with no intervening write return equal values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingStatus {
    /// Events currently held (`next - oldest`).
    pub num_events: u64,
    /// Events accepted over the buffer's lifetime (`next`).
    pub seen_events: u64,
    /// Capture time of the oldest buffered event that has one.
    ///
    /// Events without timestamps are counted in `num_events` but skipped
    /// here.
    pub oldest_event_time: Option<SystemTime>,
    /// Capture time of the newest buffered event that has one.
    pub newest_event_time: Option<SystemTime>,
}
