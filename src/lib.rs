//! # flowvisor
//!
//! **Flowvisor** is a lossy in-memory buffer for flow events with live
//! fan-out to any number of concurrent readers.
//!
//! It accepts a high-rate stream of timestamped events and exposes
//! several read modes over it: historical snapshot, replay-then-follow,
//! follow-only, and replay-since-a-point-in-time. Under overload it never
//! blocks the producer: slow consumers lose events, and every loss is
//! counted.
//!
//! ## Features
//!
//! | Area           | Description                                                       | Key types / traits                    |
//! |----------------|-------------------------------------------------------------------|---------------------------------------|
//! | **Ring**       | Bounded circular storage with monotonic sequence numbers.         | [`RingBuffer`], [`RingBufferBuilder`] |
//! | **Readers**    | Four read modes, each with cancel handle and delivery counters.   | [`ReaderHandle`], [`ReaderStats`]     |
//! | **Status**     | Point-in-time size and timestamp summary.                         | [`RingStatus`]                        |
//! | **Events**     | The observed-flow record and the timestamp seam.                  | [`FlowEvent`], [`Timestamped`]        |
//! | **Sinks**      | Managed in-process consumers fed from the ring.                   | [`Sink`], [`SinkSet`]                 |
//! | **Errors**     | Typed errors for sink management.                                 | [`DispatchError`]                     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogSink`] _(demo/reference only)_.
//!
//! ```no_run
//! use flowvisor::{FlowEvent, Protocol, RingBuffer, Verdict};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let ring: RingBuffer<FlowEvent> = RingBuffer::<FlowEvent>::builder().with_capacity(1024).build();
//!
//!     // Tail everything: replay history, then follow live writes.
//!     let (mut rx, handle) = ring.read_all(0).await;
//!
//!     let feed = ring.clone();
//!     tokio::spawn(async move {
//!         feed.write(FlowEvent::new(Protocol::Tcp, Verdict::Forwarded)).await;
//!     });
//!
//!     if let Some(flow) = rx.recv().await {
//!         println!("flow: verdict={}", flow.verdict.as_label());
//!     }
//!
//!     let stats = handle.cancel().await;
//!     println!("sent={} dropped={}", stats.sent, stats.dropped);
//! }
//! ```
//!
//! ---

mod config;
mod error;
mod events;
mod ring;
mod sinks;

// ---- Public re-exports ----

pub use config::Config;
pub use error::DispatchError;
pub use events::{FlowEvent, Protocol, Timestamped, Verdict};
pub use ring::{ReaderHandle, ReaderStats, RingBuffer, RingBufferBuilder, RingStatus};
pub use sinks::{Sink, SinkReport, SinkSet};

// Optional: expose a simple built-in log sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use sinks::LogSink;
