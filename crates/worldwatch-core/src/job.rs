//! The background polling loop.
//!
//! A [`TrackerJob`] owns the previous snapshot and runs
//! collect -> diff -> notify -> wait until its [`CancellationToken`]
//! fires. The snapshot state is touched only by the job's own task, so it
//! needs no lock.
//!
//! # Cancellation
//!
//! The loop suspends in two places, the fetch and the inter-cycle wait, and
//! both race the token. The fetch runs on its own task: when cancellation
//! wins, that task is left to finish on its own and its result is dropped.
//!
//! # Failures
//!
//! A failed poll produces an empty report and keeps the previous snapshot.
//! The next poll happens after the normal interval; there is no backoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use worldwatch_types::{SnapshotSet, SpikeReport};

use crate::collector::{DataSource, SnapshotCollector};
use crate::config::TrackerConfig;
use crate::diff::DiffEngine;
use crate::error::DataSourceError;
use crate::sink::EventSink;

/// Counters shared between a running job and status readers.
#[derive(Debug, Default)]
pub struct JobStats {
    cycles_completed: AtomicU64,
    failed_polls: AtomicU64,
    events_emitted: AtomicU64,
    collapsed_cycles: AtomicU64,
    /// Unix milliseconds of the last completed cycle, 0 if none.
    last_cycle_at_ms: AtomicI64,
    /// Unix milliseconds of the last successful poll, 0 if none.
    last_snapshot_at_ms: AtomicI64,
}

impl JobStats {
    fn record(
        &self,
        captured_at: Option<DateTime<Utc>>,
        report: &SpikeReport,
        at: DateTime<Utc>,
    ) {
        self.cycles_completed.fetch_add(1, Ordering::AcqRel);
        if captured_at.is_none() {
            self.failed_polls.fetch_add(1, Ordering::AcqRel);
        }
        if let Some(captured_at) = captured_at {
            self.last_snapshot_at_ms
                .store(captured_at.timestamp_millis(), Ordering::Release);
        }
        match report {
            SpikeReport::Spikes { events } => {
                let emitted = u64::try_from(events.len()).unwrap_or(u64::MAX);
                self.events_emitted.fetch_add(emitted, Ordering::AcqRel);
            }
            SpikeReport::Collapsed { .. } => {
                self.collapsed_cycles.fetch_add(1, Ordering::AcqRel);
            }
        }
        self.last_cycle_at_ms
            .store(at.timestamp_millis(), Ordering::Release);
    }

    /// Read a consistent-enough copy of the counters.
    pub fn snapshot(&self) -> CycleStats {
        CycleStats {
            cycles_completed: self.cycles_completed.load(Ordering::Acquire),
            failed_polls: self.failed_polls.load(Ordering::Acquire),
            events_emitted: self.events_emitted.load(Ordering::Acquire),
            collapsed_cycles: self.collapsed_cycles.load(Ordering::Acquire),
            last_cycle_at: millis_to_time(&self.last_cycle_at_ms),
            last_snapshot_at: millis_to_time(&self.last_snapshot_at_ms),
        }
    }
}

fn millis_to_time(millis: &AtomicI64) -> Option<DateTime<Utc>> {
    match millis.load(Ordering::Acquire) {
        0 => None,
        ms => Utc.timestamp_millis_opt(ms).single(),
    }
}

/// Point-in-time copy of [`JobStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    /// Cycles that ran to the end, including baseline and failed ones.
    pub cycles_completed: u64,
    /// Cycles whose poll failed.
    pub failed_polls: u64,
    /// Individual spike events delivered to the sink.
    pub events_emitted: u64,
    /// Cycles whose events were collapsed into a summary.
    pub collapsed_cycles: u64,
    /// When the last cycle completed.
    pub last_cycle_at: Option<DateTime<Utc>>,
    /// Capture time of the newest snapshot, i.e. the current baseline.
    pub last_snapshot_at: Option<DateTime<Utc>>,
}

/// One tracker job: config, baseline, and the collaborators it drives.
pub struct TrackerJob<S, K> {
    config: TrackerConfig,
    collector: SnapshotCollector<S>,
    engine: DiffEngine,
    sink: Arc<K>,
    previous: Option<SnapshotSet>,
    cycle: u64,
    stats: Arc<JobStats>,
}

impl<S: DataSource, K: EventSink> TrackerJob<S, K> {
    /// Create a job with no baseline yet.
    pub fn new(
        config: TrackerConfig,
        collector: SnapshotCollector<S>,
        engine: DiffEngine,
        sink: Arc<K>,
    ) -> Self {
        Self {
            config,
            collector,
            engine,
            sink,
            previous: None,
            cycle: 0,
            stats: Arc::new(JobStats::default()),
        }
    }

    /// The job's configuration.
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared handle to the job's counters.
    pub fn stats(&self) -> Arc<JobStats> {
        Arc::clone(&self.stats)
    }

    /// The snapshot the next cycle will diff against.
    pub const fn baseline(&self) -> Option<&SnapshotSet> {
        self.previous.as_ref()
    }

    /// Fold one poll result into the job state and build the report.
    ///
    /// The first successful poll only seeds the baseline. A failed poll
    /// leaves the baseline untouched.
    pub fn apply_poll(&mut self, polled: Result<SnapshotSet, DataSourceError>) -> SpikeReport {
        let current = match polled {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "poll failed, keeping previous snapshot");
                return SpikeReport::empty();
            }
        };

        let report = self.previous.as_ref().map_or_else(
            || {
                info!(
                    worlds = current.len(),
                    captured_at = %current.captured_at_time(),
                    "baseline snapshot captured"
                );
                SpikeReport::empty()
            },
            |previous| self.engine.compare(previous, &current, &self.config),
        );

        self.previous = Some(current);
        report
    }

    /// Run one cycle without cancellation: collect, diff, notify.
    pub async fn run_cycle(&mut self) -> SpikeReport {
        let polled = self.collector.collect().await;
        self.finish_cycle(polled).await
    }

    async fn finish_cycle(
        &mut self,
        polled: Result<SnapshotSet, DataSourceError>,
    ) -> SpikeReport {
        self.cycle = self.cycle.saturating_add(1);
        let span = info_span!("cycle", cycle = self.cycle);

        async {
            let captured_at = polled.as_ref().ok().map(SnapshotSet::captured_at_time);
            let report = self.apply_poll(polled);
            if !report.is_empty() {
                info!(spikes = report.spike_count(), "population spikes detected");
            }
            self.sink.notify(&report, &self.config).await;
            self.stats.record(captured_at, &report, Utc::now());
            report
        }
        .instrument(span)
        .await
    }

    /// Poll until `cancel` fires.
    ///
    /// The first cycle starts immediately. Returns once cancellation has
    /// been observed; no cycle starts after that.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            threshold = self.config.population_threshold(),
            interval_secs = self.config.poll_interval_seconds(),
            filter = %self.config.server_filter(),
            "tracker job started"
        );

        loop {
            // A Stop that lands as the wait ends must not start another fetch.
            if cancel.is_cancelled() {
                break;
            }

            let collector = self.collector.clone();
            let fetch = tokio::spawn(async move { collector.collect().await });

            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("cancelled during fetch, result will be discarded");
                    break;
                }
                joined = fetch => {
                    joined.unwrap_or_else(|e| Err(DataSourceError::Task(e.to_string())))
                }
            };

            self.finish_cycle(polled).await;

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }

        info!(cycles = self.cycle, "tracker job stopped");
    }
}
