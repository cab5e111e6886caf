//! # Flow events observed by the pipeline.
//!
//! [`FlowEvent`] is the record a flow source hands to the ring buffer: an
//! optional capture timestamp plus the metadata of one observed network
//! flow. The buffer never inspects anything beyond the timestamp; the rest
//! travels through untouched.
//!
//! ## Example
//! ```rust
//! use std::time::SystemTime;
//! use flowvisor::{FlowEvent, Protocol, Verdict};
//!
//! let flow = FlowEvent::new(Protocol::Tcp, Verdict::Dropped)
//!     .with_timestamp(SystemTime::now())
//!     .with_source("10.0.0.7:43812".parse().unwrap())
//!     .with_destination("10.0.1.3:443".parse().unwrap())
//!     .with_bytes(1480)
//!     .with_node("worker-2");
//!
//! assert_eq!(flow.verdict, Verdict::Dropped);
//! assert_eq!(flow.verdict.as_label(), "dropped");
//! ```

use std::net::SocketAddr;
use std::time::SystemTime;

use super::Timestamped;

/// What happened to the observed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The flow was forwarded to its destination.
    Forwarded,
    /// The flow was dropped by policy.
    Dropped,
    /// The flow errored in the datapath.
    Error,
    /// The flow was allowed but flagged for audit.
    Audit,
}

impl Verdict {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Verdict::Forwarded => "forwarded",
            Verdict::Dropped => "dropped",
            Verdict::Error => "error",
            Verdict::Audit => "audit",
        }
    }
}

/// Transport protocol of the observed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
        }
    }
}

/// One observed network flow.
///
/// Built with [`FlowEvent::new`] plus `with_*` methods. Everything except
/// the protocol and verdict is optional; a flow without a timestamp is
/// legal and simply invisible to time-based queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEvent {
    /// Capture time, if the source recorded one.
    pub at: Option<SystemTime>,
    /// Transport protocol.
    pub protocol: Protocol,
    /// Datapath verdict.
    pub verdict: Verdict,
    /// Source endpoint, if resolved.
    pub source: Option<SocketAddr>,
    /// Destination endpoint, if resolved.
    pub destination: Option<SocketAddr>,
    /// Bytes carried by the observed packet or aggregate.
    pub bytes: u64,
    /// Node that captured the flow.
    pub node: Option<String>,
    /// Free-form description attached by the source.
    pub summary: Option<String>,
}

impl FlowEvent {
    /// Creates a new flow event with no timestamp and no endpoints.
    pub fn new(protocol: Protocol, verdict: Verdict) -> Self {
        Self {
            at: None,
            protocol,
            verdict,
            source: None,
            destination: None,
            bytes: 0,
            node: None,
            summary: None,
        }
    }

    /// Attaches a capture timestamp.
    pub fn with_timestamp(mut self, at: SystemTime) -> Self {
        self.at = Some(at);
        self
    }

    /// Attaches the source endpoint.
    pub fn with_source(mut self, addr: SocketAddr) -> Self {
        self.source = Some(addr);
        self
    }

    /// Attaches the destination endpoint.
    pub fn with_destination(mut self, addr: SocketAddr) -> Self {
        self.destination = Some(addr);
        self
    }

    /// Attaches a byte count.
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = bytes;
        self
    }

    /// Attaches the capturing node's name.
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Attaches a free-form summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl Timestamped for FlowEvent {
    fn timestamp(&self) -> Option<SystemTime> {
        self.at
    }
}
