//! Event sink boundary.
//!
//! The tracker calls [`EventSink::notify`] once per completed cycle, even
//! when the report is empty. Formatting and delivery belong to the sink.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::debug;
use worldwatch_types::SpikeReport;

use crate::config::TrackerConfig;

/// Receives one [`SpikeReport`] per tracker cycle.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver a cycle's report. Empty reports may be ignored.
    ///
    /// The next cycle does not start until this future completes.
    fn notify(
        &self,
        report: &SpikeReport,
        config: &TrackerConfig,
    ) -> impl Future<Output = ()> + Send;
}

/// Forwards every report into an unbounded Tokio channel.
///
/// Useful for embedding the tracker in another event loop, and for tests.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SpikeReport>,
}

impl ChannelSink {
    /// Create a sink and the receiver its reports arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SpikeReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    async fn notify(&self, report: &SpikeReport, _config: &TrackerConfig) {
        if self.tx.send(report.clone()).is_err() {
            debug!("report receiver dropped, discarding report");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use worldwatch_types::ServerFilter;

    use super::*;

    #[tokio::test]
    async fn channel_sink_forwards_reports() {
        let (sink, mut rx) = ChannelSink::new();
        let config = TrackerConfig::new(12, 12, ServerFilter::F2p).unwrap();
        let report = SpikeReport::Collapsed {
            count: 11,
            threshold: 12,
        };

        sink.notify(&report, &config).await;
        assert_eq!(rx.recv().await.unwrap(), report);
    }

    #[tokio::test]
    async fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        let config = TrackerConfig::new(12, 12, ServerFilter::F2p).unwrap();
        sink.notify(&SpikeReport::empty(), &config).await;
    }
}
