//! # SinkSet: managed fan-out from the ring to attached sinks.
//!
//! [`SinkSet`] owns a handle to the ring and a registry of attached
//! [`Sink`]s. Each attachment subscribes a fresh live reader
//! ([`RingBuffer::read_new`]) and spawns a worker that drains the reader's
//! channel through the sink, with panics caught and reported.
//!
//! ## Diagram
//! ```text
//!   write(event)                    (one follower per sink)
//!        │
//!        ├──► [queue S1] ─► worker S1 ─► on_event()
//!        ├──► [queue S2] ─► worker S2 ─► on_event()
//!        └──► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## What it guarantees
//! - Per-sink FIFO in write order; a slow sink loses only its own events.
//! - `detach` and `shutdown` return the sink's final delivery counters.
//! - Workers drain whatever is already queued before exiting; `shutdown`
//!   waits up to the configured grace and aborts stragglers.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration, Instant};

use crate::config::Config;
use crate::error::DispatchError;
use crate::events::Timestamped;
use crate::ring::{ReaderHandle, ReaderStats, RingBuffer};

use super::Sink;

/// Final delivery accounting for one sink.
#[derive(Debug, Clone, Copy)]
pub struct SinkReport {
    /// The sink's registered name.
    pub name: &'static str,
    /// Its reader's final counters.
    pub stats: ReaderStats,
}

/// One attached sink: its ring reader and its worker task.
struct SinkEntry<T> {
    reader: ReaderHandle<T>,
    worker: JoinHandle<()>,
}

/// Managed fan-out over attached sinks, each fed by its own live reader.
pub struct SinkSet<T>
where
    T: Timestamped + Send + Sync + 'static,
{
    ring: RingBuffer<T>,
    grace: Duration,
    entries: DashMap<&'static str, SinkEntry<T>>,
}

impl<T> SinkSet<T>
where
    T: Timestamped + Send + Sync + 'static,
{
    /// Creates an empty set dispatching from `ring`.
    pub fn new(config: &Config, ring: RingBuffer<T>) -> Self {
        Self {
            ring,
            grace: config.grace,
            entries: DashMap::new(),
        }
    }

    /// Attaches a sink: subscribes a live reader sized by the sink's
    /// [`queue_capacity`](Sink::queue_capacity) and spawns its worker.
    ///
    /// Fails with [`DispatchError::SinkAlreadyExists`] if the name is
    /// taken.
    pub async fn attach(&self, sink: Arc<dyn Sink<T>>) -> Result<(), DispatchError> {
        let name = sink.name();
        if self.entries.contains_key(name) {
            return Err(DispatchError::SinkAlreadyExists { name: name.to_string() });
        }

        let (rx, reader) = self.ring.read_new(sink.queue_capacity()).await;
        let worker = tokio::spawn(run_worker(sink, rx));

        // Re-check under the map entry: another attach may have won the
        // name while we were subscribing.
        let lost_race = match self.entries.entry(name) {
            Entry::Occupied(_) => Some((reader, worker)),
            Entry::Vacant(slot) => {
                slot.insert(SinkEntry { reader, worker });
                None
            }
        };
        if let Some((reader, worker)) = lost_race {
            reader.cancel().await;
            let _ = worker.await;
            return Err(DispatchError::SinkAlreadyExists { name: name.to_string() });
        }
        Ok(())
    }

    /// Detaches a sink and returns its final delivery counters.
    ///
    /// The worker drains whatever is already queued before exiting; a
    /// worker stuck past the grace period is aborted.
    pub async fn detach(&self, name: &str) -> Result<ReaderStats, DispatchError> {
        let (_, entry) = self
            .entries
            .remove(name)
            .ok_or_else(|| DispatchError::SinkNotFound { name: name.to_string() })?;

        let stats = entry.reader.cancel().await;
        let mut worker = entry.worker;
        if timeout(self.grace, &mut worker).await.is_err() {
            worker.abort();
        }
        Ok(stats)
    }

    /// Shuts the whole set down, returning per-sink delivery counters.
    ///
    /// Cancels every reader, then waits up to the grace period for the
    /// workers to drain. Workers still running at the deadline are aborted
    /// and reported via [`DispatchError::GraceExceeded`].
    pub async fn shutdown(self) -> Result<Vec<SinkReport>, DispatchError> {
        let grace = self.grace;
        let mut reports = Vec::new();
        let mut workers = Vec::new();

        for (name, entry) in self.entries.into_iter() {
            let stats = entry.reader.cancel().await;
            reports.push(SinkReport { name, stats });
            workers.push((name, entry.worker));
        }

        let deadline = Instant::now() + grace;
        let mut stuck = Vec::new();
        for (name, mut worker) in workers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if timeout(remaining, &mut worker).await.is_err() {
                worker.abort();
                stuck.push(name.to_string());
            }
        }

        if stuck.is_empty() {
            Ok(reports)
        } else {
            Err(DispatchError::GraceExceeded { grace, stuck })
        }
    }

    /// Number of attached sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no sinks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-sink worker: drain the reader channel through the sink with panic
/// isolation.
async fn run_worker<T>(sink: Arc<dyn Sink<T>>, mut rx: mpsc::Receiver<Arc<T>>)
where
    T: Timestamped + Send + Sync + 'static,
{
    while let Some(event) = rx.recv().await {
        let fut = sink.on_event(event.as_ref());
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            eprintln!("[flowvisor] sink '{}' panicked: {panic:?}", sink.name());
        }
    }
}
