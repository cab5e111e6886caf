//! Ring buffer core: bounded storage, live fan-out, reader protocol.
//!
//! This module is the heart of the crate. [`RingBuffer`] retains the most
//! recent events in a fixed circular slot array and distributes new writes
//! to any number of concurrent readers with lossy, never-blocking
//! semantics.
//!
//! ## Contents
//! - [`RingBuffer`], [`RingBufferBuilder`] — storage, writer, and the four
//!   read-mode constructors
//! - [`ReaderHandle`], [`ReaderStats`] — per-reader cancel handle and
//!   delivery counters
//! - [`RingStatus`] — point-in-time size and timestamp summary
//!
//! ## Read modes
//! ```text
//!                       ┌─ read_current ─► history, then close
//!                       ├─ read_all ─────► history, then follow
//!   RingBuffer ─────────┤
//!                       ├─ read_since(t) ► history since t, then follow
//!                       └─ read_new ─────► follow only
//! ```
//!
//! Every mode returns `(mpsc::Receiver<Arc<T>>, ReaderHandle<T>)`; the
//! handle's `cancel` detaches the reader and yields its final
//! [`ReaderStats`]. The writer never waits on any of them.

mod buffer;
mod reader;
mod status;

pub use buffer::{RingBuffer, RingBufferBuilder};
pub use reader::{ReaderHandle, ReaderStats};
pub use status::RingStatus;
