//! # Flow sink trait.
//!
//! Provides [`Sink`] — the extension point for plugging event consumers
//! into the dispatch layer.
//!
//! Each attached sink gets:
//! - **Its own live reader** on the ring (a dedicated follower channel)
//! - **A dedicated worker task** draining that channel
//! - **Panic isolation** (panics are caught and reported, never propagated)
//!
//! ## Rules
//! - A slow sink only loses its own events (its reader's queue overflows
//!   and the drops are counted on that reader)
//! - Sinks never block the writer or each other
//! - Queue capacity is per-sink, via [`Sink::queue_capacity`]

use async_trait::async_trait;

/// Event consumer fed from the ring by a dedicated worker task.
///
/// ### Implementation notes
/// - `on_event` runs on the sink's worker, never in the writer's context
/// - Events arrive in write order; losses show up in the sink's
///   [`ReaderStats`](crate::ReaderStats), not here
/// - Handle errors internally; a panic is caught and reported but the
///   offending event is lost
#[async_trait]
pub trait Sink<T>: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &T);

    /// Returns the sink name used for registration, logs, and stats.
    ///
    /// Keep it short and unique per attached sink ("log", "metrics",
    /// "export").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the delivery queue capacity for this sink's reader.
    ///
    /// When the queue is full the writer drops events for this sink only.
    /// Defaults to 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
