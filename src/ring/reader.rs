//! # Reader handles, statistics, and the replay protocol.
//!
//! Every read mode on [`RingBuffer`](super::RingBuffer) hands back two
//! things: the receiving half of a bounded channel and a [`ReaderHandle`].
//! The handle is the reader's cancel function — consuming it detaches the
//! reader, stops its background task, and returns the final
//! [`ReaderStats`].
//!
//! ## Replay → follow handoff
//! A replay task walks historical slots under the shared lock. When it
//! observes `seq == next` it is caught up: it drops the shared guard, takes
//! the exclusive guard, and re-checks, since the state may have changed
//! while no lock was held. Only if the check still holds does it register
//! the reader's channel in the follower set; otherwise it falls back to
//! shared-lock replay of whatever was written in between. This is what
//! makes the handoff gapless and duplicate-free.
//!
//! ## Ready signal
//! A reader task fires a oneshot right after its first lock acquisition,
//! and the constructor awaits it before returning. A write issued after the
//! constructor returns is therefore ordered after the reader's first
//! observation of the buffer.
//!
//! ## Rules
//! - Replay sends **block** against the consumer but are interruptible by
//!   cancel; writer fan-out sends never block (see
//!   [`RingBuffer::write`](super::RingBuffer::write)).
//! - The channel closes by dropping its last sender: the registry entry
//!   removed under the exclusive lock, and the task's own sender on exit.
//!   Cancel joins the task before touching the registry, so no send can
//!   follow cancel's return.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::buffer::{Follower, Shared};

/// Delivery counters for a single reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Events handed to this reader's channel.
    pub sent: u64,
    /// Events this reader missed: delivery queue full, or replay fell
    /// behind the oldest retained sequence.
    pub dropped: u64,
}

/// Cancel handle for one reader.
///
/// [`cancel`](Self::cancel) consumes the handle, so a double cancel is
/// unrepresentable. Dropping the handle without cancelling leaves the
/// reader attached; once its receiver is gone every delivery to it counts
/// as a drop, so cancel readers you are done with.
pub struct ReaderHandle<T> {
    shared: Arc<RwLock<Shared<T>>>,
    id: u64,
    token: CancellationToken,
    task: Option<JoinHandle<Option<ReaderStats>>>,
}

impl<T> ReaderHandle<T> {
    pub(crate) fn new(
        shared: Arc<RwLock<Shared<T>>>,
        id: u64,
        token: CancellationToken,
        task: Option<JoinHandle<Option<ReaderStats>>>,
    ) -> Self {
        Self {
            shared,
            id,
            token,
            task,
        }
    }

    /// Detaches the reader and returns its final delivery counters.
    ///
    /// Signals the reader task to stop, joins it, and removes the follower
    /// registration if the reader reached follow mode. After this returns
    /// the channel delivers nothing further and closes once drained.
    pub async fn cancel(mut self) -> ReaderStats {
        self.token.cancel();

        // A task that exited while still replaying (or streaming a
        // snapshot) reports its own stats; one that reached follow mode
        // left them in the registry.
        if let Some(task) = self.task.take() {
            if let Ok(Some(stats)) = task.await {
                return stats;
            }
        }

        let mut ring = self.shared.write().await;
        match ring.followers.remove(&self.id) {
            Some(follower) => follower.stats,
            None => ReaderStats::default(),
        }
    }
}

/// Spawns the replay-then-follow task behind `read_all` / `read_since`.
///
/// Returns once the task has observed the buffer at least once.
pub(crate) async fn spawn_replay<T>(
    shared: Arc<RwLock<Shared<T>>>,
    id: u64,
    seq: u64,
    tx: mpsc::Sender<Arc<T>>,
    token: CancellationToken,
) -> JoinHandle<Option<ReaderStats>>
where
    T: Send + Sync + 'static,
{
    let (ready_tx, ready_rx) = oneshot::channel();
    let task = tokio::spawn(replay(shared, id, seq, tx, token, ready_tx));
    // A panicked task drops the sender, which also unblocks us.
    let _ = ready_rx.await;
    task
}

/// Spawns the bounded stream task behind `read_current`: deliver exactly
/// the events in `[seq, end)` as captured at call time, then close.
pub(crate) async fn spawn_current<T>(
    shared: Arc<RwLock<Shared<T>>>,
    seq: u64,
    end: u64,
    tx: mpsc::Sender<Arc<T>>,
    token: CancellationToken,
) -> JoinHandle<Option<ReaderStats>>
where
    T: Send + Sync + 'static,
{
    let (ready_tx, ready_rx) = oneshot::channel();
    let task = tokio::spawn(stream_current(shared, seq, end, tx, token, ready_tx));
    let _ = ready_rx.await;
    task
}

/// Replay loop: historical slots under the shared lock, then the
/// shared→exclusive upgrade into follow mode.
///
/// Returns `Some(stats)` if the reader never reached follow mode (cancel,
/// or receiver gone); `None` once the stats have moved into the registry.
async fn replay<T>(
    shared: Arc<RwLock<Shared<T>>>,
    id: u64,
    mut seq: u64,
    tx: mpsc::Sender<Arc<T>>,
    token: CancellationToken,
    ready: oneshot::Sender<()>,
) -> Option<ReaderStats>
where
    T: Send + Sync + 'static,
{
    let mut stats = ReaderStats::default();
    let mut ready = Some(ready);

    loop {
        let ring = shared.read().await;
        if let Some(ready) = ready.take() {
            let _ = ready.send(());
        }

        // Caught up: try to move from replay to follow mode.
        if seq == ring.next {
            drop(ring);
            let mut ring = shared.write().await;
            // Re-check: the state may have changed while no lock was held.
            if seq == ring.next {
                ring.followers.insert(id, Follower { tx, stats });
                return None;
            }
            // A write slipped in; replay it under the shared lock.
            drop(ring);
            continue;
        }

        // The writer lapped us: account for the overwritten events.
        if seq < ring.oldest {
            stats.dropped += ring.oldest - seq;
            seq = ring.oldest;
        }

        let event = ring.slot(seq);
        drop(ring);

        tokio::select! {
            _ = token.cancelled() => return Some(stats),
            res = tx.send(event) => match res {
                Ok(()) => {
                    stats.sent += 1;
                    seq += 1;
                }
                // Receiver gone; nobody left to deliver to.
                Err(_) => return Some(stats),
            }
        }
    }
}

/// Snapshot stream loop for `read_current`.
///
/// Never registers as a follower. If the remainder of the captured range is
/// overwritten before it can be sent, it is counted as dropped and the
/// stream ends.
async fn stream_current<T>(
    shared: Arc<RwLock<Shared<T>>>,
    mut seq: u64,
    end: u64,
    tx: mpsc::Sender<Arc<T>>,
    token: CancellationToken,
    ready: oneshot::Sender<()>,
) -> Option<ReaderStats>
where
    T: Send + Sync + 'static,
{
    let mut stats = ReaderStats::default();
    let mut ready = Some(ready);

    while seq < end {
        let ring = shared.read().await;
        if let Some(ready) = ready.take() {
            let _ = ready.send(());
        }

        if seq < ring.oldest {
            if end <= ring.oldest {
                // Everything we still wanted has been overwritten.
                stats.dropped += end - seq;
                return Some(stats);
            }
            stats.dropped += ring.oldest - seq;
            seq = ring.oldest;
        }

        let event = ring.slot(seq);
        drop(ring);

        tokio::select! {
            _ = token.cancelled() => return Some(stats),
            res = tx.send(event) => match res {
                Ok(()) => {
                    stats.sent += 1;
                    seq += 1;
                }
                Err(_) => return Some(stats),
            }
        }
    }

    Some(stats)
}
