//! # The flow-event ring buffer.
//!
//! [`RingBuffer`] keeps the most recent `capacity` events in a fixed slot
//! array addressed by monotonic sequence numbers, and fans each new write
//! out to any number of live followers without ever blocking the writer.
//!
//! ## What it guarantees
//! - `write` never waits on a reader; a follower that is not ready loses
//!   exactly that event, counted per reader and in aggregate.
//! - Per-follower delivery order matches write order; gaps are silent and
//!   visible only through the counters.
//! - `snapshot` and `status` are point-in-time views consistent with some
//!   serialization point between writes.
//! - The replay→follow handoff of `read_all` / `read_since` neither skips
//!   nor duplicates events (see [`reader`](super) for the protocol).
//!
//! ## What it does **not** guarantee
//! - Durability: the buffer is memory only, and overwritten events are
//!   gone.
//! - Delivery: a slow reader's losses are counted, never retried.
//!
//! ## Locking
//! One readers-writer lock guards the whole ring state: slots, the
//! `oldest`/`next` sequences, the follower registry, and the aggregate
//! counters. The writer holds it exclusively while storing and fanning
//! out; readers hold it shared while copying and exclusively only for the
//! replay→follow transition and deregistration.
//!
//! ```text
//!   write(event) ──► [slot next%C] ── next++ ── oldest catch-up
//!        │
//!        ├─ try_send ─► follower 1   (full? dropped++)
//!        ├─ try_send ─► follower 2
//!        └─ try_send ─► follower N
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::Timestamped;

use super::reader::{self, ReaderHandle, ReaderStats};
use super::status::RingStatus;

/// A registered live follower: its delivery channel and counters.
pub(crate) struct Follower<T> {
    pub(crate) tx: mpsc::Sender<Arc<T>>,
    pub(crate) stats: ReaderStats,
}

/// Ring state guarded by the one readers-writer lock.
pub(crate) struct Shared<T> {
    /// Slot array; `slots.len()` is the capacity, zero means follow-only.
    slots: Box<[Option<Arc<T>>]>,
    /// Sequence of the oldest event still present (== `next` when empty).
    pub(crate) oldest: u64,
    /// Sequence the next written event will receive.
    pub(crate) next: u64,
    /// Live followers keyed by reader id.
    pub(crate) followers: HashMap<u64, Follower<T>>,
    /// Aggregate deliveries across all followers.
    sent: u64,
    /// Aggregate drops across all followers.
    dropped: u64,
}

impl<T> Shared<T> {
    fn capacity(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Clones the event at `seq`.
    ///
    /// Callers must hold the lock and `oldest <= seq < next`.
    pub(crate) fn slot(&self, seq: u64) -> Arc<T> {
        let idx = (seq % self.capacity()) as usize;
        self.slots[idx]
            .as_ref()
            .cloned()
            .expect("slot within [oldest, next) is populated")
    }
}

/// Lossy, bounded, in-memory event buffer with live fan-out.
///
/// Stores `Arc` references: overwriting a slot drops only the ring's hold,
/// while in-flight channel sends and snapshot copies keep theirs. Cloning
/// the buffer is cheap and shares all state.
///
/// See the [module docs](self) for the concurrency contract.
pub struct RingBuffer<T> {
    shared: Arc<RwLock<Shared<T>>>,
    /// Fixed at construction; kept outside the lock like the slot count it
    /// mirrors.
    capacity: usize,
    /// Ticket counter for reader ids. Not ring state, so not under the
    /// lock.
    reader_ids: Arc<AtomicU64>,
}

impl<T> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            capacity: self.capacity,
            reader_ids: Arc::clone(&self.reader_ids),
        }
    }
}

/// Fluent builder for [`RingBuffer`].
#[derive(Clone, Debug, Default)]
pub struct RingBufferBuilder {
    capacity: usize,
}

impl RingBufferBuilder {
    /// Creates a builder with no history (capacity zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of historical events retained. Zero keeps no history: all
    /// read modes degenerate to follow-only.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the buffer.
    pub fn build<T>(self) -> RingBuffer<T>
    where
        T: Timestamped + Send + Sync + 'static,
    {
        RingBuffer::with_capacity(self.capacity)
    }
}

impl<T> RingBuffer<T>
where
    T: Timestamped + Send + Sync + 'static,
{
    /// Returns a fluent builder.
    pub fn builder() -> RingBufferBuilder {
        RingBufferBuilder::new()
    }

    /// Creates a buffer retaining `capacity` historical events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: Arc::new(RwLock::new(Shared {
                slots: vec![None; capacity].into_boxed_slice(),
                oldest: 0,
                next: 0,
                followers: HashMap::new(),
                sent: 0,
                dropped: 0,
            })),
            capacity,
            reader_ids: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a buffer from [`Config`].
    pub fn with_config(config: &Config) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// Appends one event and fans it out to every live follower.
    ///
    /// Runs entirely under the exclusive lock: store the slot, advance the
    /// sequences, then one non-blocking delivery attempt per follower. A
    /// follower whose queue is full (or whose receiver is gone) loses
    /// exactly this event and has its `dropped` counter bumped; nothing is
    /// retried. Concurrent callers are serialized by the lock; none of
    /// them ever waits on a reader.
    pub async fn write(&self, event: impl Into<Arc<T>>) {
        let event = event.into();
        let mut ring = self.shared.write().await;

        let capacity = ring.capacity();
        if capacity > 0 {
            let idx = (ring.next % capacity) as usize;
            ring.slots[idx] = Some(Arc::clone(&event));
        }
        ring.next += 1;

        // Advance past anything this write just overwrote.
        let floor = ring.next.saturating_sub(capacity);
        if ring.oldest < floor {
            ring.oldest = floor;
        }

        let (mut sent, mut dropped) = (0, 0);
        for follower in ring.followers.values_mut() {
            match follower.tx.try_send(Arc::clone(&event)) {
                Ok(()) => {
                    follower.stats.sent += 1;
                    sent += 1;
                }
                Err(_) => {
                    follower.stats.dropped += 1;
                    dropped += 1;
                }
            }
        }
        ring.sent += sent;
        ring.dropped += dropped;
    }

    /// Copies the buffered events, oldest to newest, into `dst`.
    ///
    /// `dst` is cleared and refilled so its allocation can be reused
    /// across calls. The copies are owned: later writes never mutate them.
    /// With no history (capacity zero) or an empty buffer, `dst` is left
    /// empty.
    pub async fn snapshot(&self, dst: &mut Vec<Arc<T>>) {
        dst.clear();
        let ring = self.shared.read().await;
        dst.reserve((ring.next - ring.oldest) as usize);
        for seq in ring.oldest..ring.next {
            dst.push(ring.slot(seq));
        }
    }

    /// Point-in-time status under the shared lock.
    ///
    /// Events without timestamps are skipped when picking the oldest and
    /// newest times but still counted in `num_events`.
    pub async fn status(&self) -> RingStatus {
        let ring = self.shared.read().await;
        let mut status = RingStatus {
            num_events: ring.next - ring.oldest,
            seen_events: ring.next,
            oldest_event_time: None,
            newest_event_time: None,
        };
        for seq in ring.oldest..ring.next {
            if let Some(at) = ring.slot(seq).timestamp() {
                status.oldest_event_time = Some(at);
                break;
            }
        }
        for seq in (ring.oldest..ring.next).rev() {
            if let Some(at) = ring.slot(seq).timestamp() {
                status.newest_event_time = Some(at);
                break;
            }
        }
        status
    }

    /// Aggregate `{sent, dropped}` across all follower deliveries, for
    /// monitoring.
    pub async fn delivery_stats(&self) -> ReaderStats {
        let ring = self.shared.read().await;
        ReaderStats {
            sent: ring.sent,
            dropped: ring.dropped,
        }
    }

    /// Follow-only reader: no history; every event written after
    /// registration is either delivered or counted as dropped.
    ///
    /// `ch_capacity` sizes the delivery queue and is clamped to one slot.
    /// Production readers keep it minimal so "slow" means "not receiving
    /// around the instant of the write"; larger values are for test
    /// determinism.
    pub async fn read_new(
        &self,
        ch_capacity: usize,
    ) -> (mpsc::Receiver<Arc<T>>, ReaderHandle<T>) {
        let (tx, rx) = mpsc::channel(ch_capacity.max(1));
        let id = self.next_reader_id();

        let mut ring = self.shared.write().await;
        ring.followers.insert(
            id,
            Follower {
                tx,
                stats: ReaderStats::default(),
            },
        );
        drop(ring);

        let handle = ReaderHandle::new(
            Arc::clone(&self.shared),
            id,
            CancellationToken::new(),
            None,
        );
        (rx, handle)
    }

    /// Replays everything currently buffered, then follows live writes.
    ///
    /// Returns after the replay task has observed the buffer once, so a
    /// write issued afterwards is ordered behind the replay start. With no
    /// history this is exactly [`read_new`](Self::read_new).
    pub async fn read_all(
        &self,
        ch_capacity: usize,
    ) -> (mpsc::Receiver<Arc<T>>, ReaderHandle<T>) {
        if self.capacity == 0 {
            return self.read_new(ch_capacity).await;
        }
        let oldest = self.shared.read().await.oldest;
        self.read_from(oldest, ch_capacity).await
    }

    /// Streams exactly the events present at call time, then closes.
    ///
    /// Never becomes a follower. If the stream falls so far behind that
    /// the rest of the captured range is overwritten, the remainder is
    /// counted as dropped and the channel closes early.
    pub async fn read_current(
        &self,
        ch_capacity: usize,
    ) -> (mpsc::Receiver<Arc<T>>, ReaderHandle<T>) {
        let (tx, rx) = mpsc::channel(ch_capacity.max(1));
        let id = self.next_reader_id();
        let token = CancellationToken::new();

        if self.capacity == 0 {
            // Nothing to stream: hand back an already-closed channel.
            drop(tx);
            let handle =
                ReaderHandle::new(Arc::clone(&self.shared), id, token, None);
            return (rx, handle);
        }

        let (seq, end) = {
            let ring = self.shared.read().await;
            (ring.oldest, ring.next)
        };
        if seq == end {
            drop(tx);
            let handle =
                ReaderHandle::new(Arc::clone(&self.shared), id, token, None);
            return (rx, handle);
        }

        let task = reader::spawn_current(
            Arc::clone(&self.shared),
            seq,
            end,
            tx,
            token.clone(),
        )
        .await;
        let handle =
            ReaderHandle::new(Arc::clone(&self.shared), id, token, Some(task));
        (rx, handle)
    }

    /// Replays events captured at or after `since`, then follows.
    ///
    /// Scans newest to oldest for the first event whose timestamp is
    /// strictly before `since` and resumes just past it, so replay starts
    /// at the first event with a timestamp at or after `since`. Events
    /// without timestamps never match the scan. When nothing precedes
    /// `since`, the whole retained history is replayed.
    pub async fn read_since(
        &self,
        since: SystemTime,
        ch_capacity: usize,
    ) -> (mpsc::Receiver<Arc<T>>, ReaderHandle<T>) {
        if self.capacity == 0 {
            return self.read_new(ch_capacity).await;
        }

        let start = {
            let ring = self.shared.read().await;
            let mut start = 0;
            for seq in (ring.oldest..ring.next).rev() {
                match ring.slot(seq).timestamp() {
                    Some(at) if at < since => {
                        start = seq + 1;
                        break;
                    }
                    _ => {}
                }
            }
            start
        };
        self.read_from(start, ch_capacity).await
    }

    /// Replay from `seq` (clamped to `oldest` by the replay loop), then
    /// follow.
    async fn read_from(
        &self,
        seq: u64,
        ch_capacity: usize,
    ) -> (mpsc::Receiver<Arc<T>>, ReaderHandle<T>) {
        let (tx, rx) = mpsc::channel(ch_capacity.max(1));
        let id = self.next_reader_id();
        let token = CancellationToken::new();

        let task = reader::spawn_replay(
            Arc::clone(&self.shared),
            id,
            seq,
            tx,
            token.clone(),
        )
        .await;
        let handle =
            ReaderHandle::new(Arc::clone(&self.shared), id, token, Some(task));
        (rx, handle)
    }

    fn next_reader_id(&self) -> u64 {
        self.reader_ids.fetch_add(1, AtomicOrdering::Relaxed)
    }
}
