//! `status`: point-in-time size and timestamp summary.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use flowvisor::{FlowEvent, Protocol, RingBuffer, RingStatus, Verdict};

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn stamped(secs: u64) -> Arc<FlowEvent> {
    Arc::new(FlowEvent::new(Protocol::Tcp, Verdict::Forwarded).with_timestamp(at(secs)))
}

fn bare() -> Arc<FlowEvent> {
    Arc::new(FlowEvent::new(Protocol::Tcp, Verdict::Forwarded))
}

#[tokio::test]
async fn empty_status_is_zeroed() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    assert_eq!(ring.status().await, RingStatus::default());
}

#[tokio::test]
async fn status_is_idempotent_without_writes() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    ring.write(stamped(100)).await;
    ring.write(stamped(200)).await;

    let first = ring.status().await;
    let second = ring.status().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn reports_oldest_and_newest_times() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    ring.write(stamped(100)).await;
    ring.write(stamped(200)).await;
    ring.write(stamped(300)).await;

    let status = ring.status().await;
    assert_eq!(status.num_events, 3);
    assert_eq!(status.seen_events, 3);
    assert_eq!(status.oldest_event_time, Some(at(100)));
    assert_eq!(status.newest_event_time, Some(at(300)));
}

#[tokio::test]
async fn untimed_events_are_counted_but_skipped_for_times() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    ring.write(bare()).await;
    ring.write(stamped(200)).await;
    ring.write(stamped(300)).await;
    ring.write(bare()).await;

    let status = ring.status().await;
    assert_eq!(status.num_events, 4);
    assert_eq!(status.oldest_event_time, Some(at(200)));
    assert_eq!(status.newest_event_time, Some(at(300)));
}

#[tokio::test]
async fn only_untimed_events_leave_times_unset() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(4);
    ring.write(bare()).await;
    ring.write(bare()).await;

    let status = ring.status().await;
    assert_eq!(status.num_events, 2);
    assert_eq!(status.oldest_event_time, None);
    assert_eq!(status.newest_event_time, None);
}

#[tokio::test]
async fn overflow_reports_retained_window() {
    let ring: RingBuffer<FlowEvent> = RingBuffer::with_capacity(3);
    for secs in [100, 200, 300, 400, 500] {
        ring.write(stamped(secs)).await;
    }

    let status = ring.status().await;
    assert_eq!(status.num_events, 3);
    assert_eq!(status.seen_events, 5);
    assert_eq!(status.oldest_event_time, Some(at(300)));
    assert_eq!(status.newest_event_time, Some(at(500)));
}
