//! # LogSink — simple flow printer.
//!
//! A minimal sink that prints each incoming [`FlowEvent`] to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [forwarded] proto=tcp src=10.0.0.7:43812 dst=10.0.1.3:443 bytes=1480
//! [dropped] proto=udp src=10.0.0.9:5353 dst=- bytes=212
//! ```

use async_trait::async_trait;

use crate::events::FlowEvent;

use super::Sink;

/// Flow printer sink.
pub struct LogSink;

impl LogSink {
    /// Constructs a new [`LogSink`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink<FlowEvent> for LogSink {
    async fn on_event(&self, flow: &FlowEvent) {
        let src = flow
            .source
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let dst = flow
            .destination
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] proto={} src={src} dst={dst} bytes={}",
            flow.verdict.as_label(),
            flow.protocol.as_label(),
            flow.bytes,
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
