//! Sink dispatch: delivery, slow-sink drops, panic isolation, shutdown.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use flowvisor::{
    Config, DispatchError, FlowEvent, Protocol, ReaderStats, RingBuffer, Sink, SinkSet, Verdict,
};

fn flow(n: u64) -> FlowEvent {
    FlowEvent::new(Protocol::Tcp, Verdict::Forwarded).with_bytes(n)
}

/// Forwards each event's byte count to the test.
struct ForwardSink {
    name: &'static str,
    out: mpsc::UnboundedSender<u64>,
}

#[async_trait]
impl Sink<FlowEvent> for ForwardSink {
    async fn on_event(&self, event: &FlowEvent) {
        let _ = self.out.send(event.bytes);
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn queue_capacity(&self) -> usize {
        16
    }
}

/// Reports each event, then waits on a gate before finishing it.
struct StallSink {
    out: mpsc::UnboundedSender<u64>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl Sink<FlowEvent> for StallSink {
    async fn on_event(&self, event: &FlowEvent) {
        let _ = self.out.send(event.bytes);
        self.gate.acquire().await.expect("gate never closes").forget();
    }

    fn name(&self) -> &'static str {
        "stall"
    }

    fn queue_capacity(&self) -> usize {
        1
    }
}

/// Panics on one specific event, forwards the rest.
struct PanicSink {
    out: mpsc::UnboundedSender<u64>,
}

#[async_trait]
impl Sink<FlowEvent> for PanicSink {
    async fn on_event(&self, event: &FlowEvent) {
        if event.bytes == 2 {
            panic!("boom");
        }
        let _ = self.out.send(event.bytes);
    }

    fn name(&self) -> &'static str {
        "panicky"
    }

    fn queue_capacity(&self) -> usize {
        16
    }
}

#[tokio::test]
async fn events_reach_attached_sinks() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(8);
    let set = SinkSet::new(&Config::default(), ring.clone());

    let (tx, mut out) = mpsc::unbounded_channel();
    set.attach(Arc::new(ForwardSink { name: "forward", out: tx }))
        .await
        .unwrap();
    assert_eq!(set.len(), 1);

    for n in 1..=3 {
        ring.write(flow(n)).await;
    }
    for n in 1..=3 {
        assert_eq!(out.recv().await, Some(n));
    }

    let stats = set.detach("forward").await.unwrap();
    assert_eq!(stats, ReaderStats { sent: 3, dropped: 0 });
    assert!(set.is_empty());
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    let set = SinkSet::new(&Config::default(), ring);

    let (tx_a, _out_a) = mpsc::unbounded_channel();
    let (tx_b, _out_b) = mpsc::unbounded_channel();
    set.attach(Arc::new(ForwardSink { name: "forward", out: tx_a }))
        .await
        .unwrap();

    let err = set
        .attach(Arc::new(ForwardSink { name: "forward", out: tx_b }))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::SinkAlreadyExists { .. }));
    assert_eq!(err.as_label(), "dispatch_sink_already_exists");
    assert_eq!(set.len(), 1);
}

#[tokio::test]
async fn detach_unknown_sink_fails() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    let set = SinkSet::new(&Config::default(), ring);

    let err = set.detach("nope").await.unwrap_err();
    assert!(matches!(err, DispatchError::SinkNotFound { .. }));
}

#[tokio::test]
async fn slow_sink_loses_only_its_overflow() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(8);
    let set = SinkSet::new(&Config::default(), ring.clone());

    let gate = Arc::new(Semaphore::new(0));
    let (tx, mut out) = mpsc::unbounded_channel();
    set.attach(Arc::new(StallSink { out: tx, gate: Arc::clone(&gate) }))
        .await
        .unwrap();

    ring.write(flow(1)).await;
    // The worker now holds event 1 inside on_event; its one-slot queue is
    // free again.
    assert_eq!(out.recv().await, Some(1));

    ring.write(flow(2)).await; // queued
    ring.write(flow(3)).await; // queue full: dropped

    gate.add_permits(2);
    assert_eq!(out.recv().await, Some(2));

    let stats = set.detach("stall").await.unwrap();
    assert_eq!(stats, ReaderStats { sent: 2, dropped: 1 });
}

#[tokio::test]
async fn panicking_sink_keeps_its_worker() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(8);
    let set = SinkSet::new(&Config::default(), ring.clone());

    let (tx, mut out) = mpsc::unbounded_channel();
    set.attach(Arc::new(PanicSink { out: tx })).await.unwrap();

    for n in 1..=3 {
        ring.write(flow(n)).await;
    }
    assert_eq!(out.recv().await, Some(1));
    assert_eq!(out.recv().await, Some(3)); // 2 panicked, worker survived

    let stats = set.detach("panicky").await.unwrap();
    assert_eq!(stats, ReaderStats { sent: 3, dropped: 0 });
}

#[tokio::test]
async fn shutdown_reports_per_sink_stats() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(8);
    let set = SinkSet::new(&Config::default(), ring.clone());

    let (tx_a, mut out_a) = mpsc::unbounded_channel();
    let (tx_b, mut out_b) = mpsc::unbounded_channel();
    set.attach(Arc::new(ForwardSink { name: "alpha", out: tx_a }))
        .await
        .unwrap();
    set.attach(Arc::new(ForwardSink { name: "bravo", out: tx_b }))
        .await
        .unwrap();

    ring.write(flow(1)).await;
    ring.write(flow(2)).await;
    for out in [&mut out_a, &mut out_b] {
        assert_eq!(out.recv().await, Some(1));
        assert_eq!(out.recv().await, Some(2));
    }

    let mut reports = set.shutdown().await.unwrap();
    reports.sort_by_key(|r| r.name);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "alpha");
    assert_eq!(reports[1].name, "bravo");
    for report in &reports {
        assert_eq!(report.stats, ReaderStats { sent: 2, dropped: 0 });
    }
}
