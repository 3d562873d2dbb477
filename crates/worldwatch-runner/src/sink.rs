//! Log-rendering event sink.
//!
//! Turns each non-empty report into chat-style lines and writes them
//! through `tracing`. Empty reports are dropped here; the tracker still
//! hands them over every cycle.

use tracing::info;
use worldwatch_core::config::TrackerConfig;
use worldwatch_core::sink::EventSink;
use worldwatch_types::{SpikeEvent, SpikeReport};

/// Writes spike reports to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    async fn notify(&self, report: &SpikeReport, config: &TrackerConfig) {
        if report.is_empty() {
            return;
        }

        info!(
            spikes = report.spike_count(),
            filter = %config.server_filter(),
            threshold = config.population_threshold(),
            "population change report"
        );
        for line in render_report(report) {
            info!("{line}");
        }
    }
}

/// Render a report as one line per event, or a single summary line.
pub fn render_report(report: &SpikeReport) -> Vec<String> {
    match report {
        SpikeReport::Spikes { events } => events.iter().map(render_event).collect(),
        SpikeReport::Collapsed { count, threshold } => {
            vec![format!(
                "{count} worlds with a change of {threshold} or greater"
            )]
        }
    }
}

fn render_event(event: &SpikeEvent) -> String {
    let direction = if event.is_increase() {
        "increased"
    } else {
        "decreased"
    };
    format!(
        "World {} ({}) has {direction} by {} players.",
        event.world_id,
        event.label(),
        event.magnitude()
    )
}
