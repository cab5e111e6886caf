//! # Flow sinks: in-process consumers fed from the ring.
//!
//! This module provides the [`Sink`] trait and [`SinkSet`], the managed
//! fan-out that feeds each attached sink through its own live ring reader.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   source ── write(event) ──► RingBuffer ──► one follower per sink
//!                                                │
//!                                           ┌────┴────┬─────────┐
//!                                           ▼         ▼         ▼
//!                                        LogSink   Metrics   Custom ...
//! ```
//!
//! ## Implementing custom sinks
//! ```no_run
//! use flowvisor::{FlowEvent, Sink, Verdict};
//! use async_trait::async_trait;
//!
//! struct DropCounter;
//!
//! #[async_trait]
//! impl Sink<FlowEvent> for DropCounter {
//!     async fn on_event(&self, flow: &FlowEvent) {
//!         if flow.verdict == Verdict::Dropped {
//!             // increment a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "drop-counter"
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod sink;

#[cfg(feature = "logging")]
pub use log::LogSink;
pub use set::{SinkReport, SinkSet};
pub use sink::Sink;
