//! Flow tail demo.
//!
//! Feeds synthetic flows into a ring buffer and tails them through the
//! built-in `LogSink`.
//!
//! What it shows:
//! - Building a ring from `Config`
//! - Attaching a sink and letting the dispatch layer feed it
//! - Reading status and per-sink delivery stats at the end
//!
//! Run with:
//! `cargo run --example flow_tail --features logging`

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use flowvisor::{Config, FlowEvent, LogSink, Protocol, RingBuffer, SinkSet, Verdict};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut cfg = Config::default();
    cfg.capacity = 64;

    let ring: RingBuffer<FlowEvent> = RingBuffer::with_config(&cfg);
    let set = SinkSet::new(&cfg, ring.clone());
    set.attach(Arc::new(LogSink::new()))
        .await
        .expect("attach log sink");

    let verdicts = [
        Verdict::Forwarded,
        Verdict::Forwarded,
        Verdict::Dropped,
        Verdict::Audit,
    ];

    let feed = ring.clone();
    let producer = tokio::spawn(async move {
        for n in 0..20u64 {
            let flow = FlowEvent::new(Protocol::Tcp, verdicts[(n % 4) as usize])
                .with_timestamp(SystemTime::now())
                .with_source(format!("10.0.0.{}:40000", n % 8).parse().unwrap())
                .with_destination("10.0.1.3:443".parse().unwrap())
                .with_bytes(64 + n * 13)
                .with_node("demo-node");
            feed.write(flow).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    });

    let _ = producer.await;

    let status = ring.status().await;
    println!("buffered={} seen={}", status.num_events, status.seen_events);

    match set.shutdown().await {
        Ok(reports) => {
            for r in reports {
                println!("sink={} sent={} dropped={}", r.name, r.stats.sent, r.stats.dropped);
            }
        }
        Err(e) => eprintln!("shutdown: {e}"),
    }
}
