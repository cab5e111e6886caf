//! # Event timestamp extraction.
//!
//! The ring buffer treats events as opaque payloads. The single thing it
//! ever asks of one is its capture time, through [`Timestamped`]. `None`
//! marks an event that carries no timestamp: such events are stored and
//! delivered like any other, but time-based queries and status timestamps
//! skip over them.

use std::time::SystemTime;

/// Timestamp seam between the ring buffer and its event type.
///
/// The buffer never reads the clock itself; all times come in on events.
/// Implemented by [`FlowEvent`](crate::events::FlowEvent); anything else
/// that wants to ride the ring implements it the same way.
pub trait Timestamped {
    /// Returns the capture time of this event, or `None` if it has none.
    fn timestamp(&self) -> Option<SystemTime>;
}
