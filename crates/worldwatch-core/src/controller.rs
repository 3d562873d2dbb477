//! Lifecycle controller: Start, Stop, Status.
//!
//! The controller holds at most one active job. Its slot sits behind a
//! [`tokio::sync::Mutex`] that is held for the whole of each Start and
//! Stop call, so two Starts cannot both succeed and a Stop always sees the
//! job a completed Start installed.
//!
//! ```text
//!            start (valid)
//!   Idle ───────────────────▶ Running
//!    ▲                           │
//!    └───────── stop ────────────┘
//! ```
//!
//! A job task that ends on its own (it panicked) leaves the controller
//! reporting `Idle`; the next Start replaces it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{info, warn};
use worldwatch_types::TrackerState;

use crate::collector::{DataSource, SnapshotCollector};
use crate::config::{TrackerConfig, TrackerOptions};
use crate::diff::DiffEngine;
use crate::error::LifecycleError;
use crate::job::{CycleStats, JobStats, TrackerJob};
use crate::limits::DiffLimits;
use crate::sink::EventSink;

/// Read-only view of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerStatus {
    /// Whether a job is running.
    pub state: TrackerState,
    /// The running job's configuration.
    pub config: Option<TrackerConfig>,
    /// When the running job was started.
    pub started_at: Option<DateTime<Utc>>,
    /// The running job's counters.
    pub stats: Option<CycleStats>,
}

impl TrackerStatus {
    const fn idle() -> Self {
        Self {
            state: TrackerState::Idle,
            config: None,
            started_at: None,
            stats: None,
        }
    }
}

struct ActiveJob {
    config: TrackerConfig,
    started_at: DateTime<Utc>,
    stats: Arc<JobStats>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    /// Cancels the job if the controller is dropped while running.
    _guard: DropGuard,
}

impl ActiveJob {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Owns the single active tracker job, if any.
pub struct LifecycleController<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    limits: DiffLimits,
    active: Mutex<Option<ActiveJob>>,
}

impl<S: DataSource, K: EventSink> LifecycleController<S, K> {
    /// Create an idle controller over the given source and sink.
    pub fn new(source: Arc<S>, sink: Arc<K>) -> Self {
        Self {
            source,
            sink,
            limits: DiffLimits::default(),
            active: Mutex::new(None),
        }
    }

    /// Use different diff caps for jobs started from now on.
    #[must_use]
    pub const fn with_limits(mut self, limits: DiffLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validate `options` and start polling in the background.
    ///
    /// Returns as soon as the job task is spawned; the first cycle runs
    /// immediately but asynchronously.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyRunning`] if a job is live, or
    /// [`LifecycleError::InvalidConfig`] if the options fail validation.
    /// Neither changes the controller's state.
    pub async fn start(&self, options: &TrackerOptions) -> Result<TrackerConfig, LifecycleError> {
        let mut active = self.active.lock().await;

        if let Some(job) = active.as_ref() {
            if job.is_live() {
                return Err(LifecycleError::AlreadyRunning);
            }
            warn!("previous tracker job ended on its own, replacing it");
        }

        let config = options.validate()?;

        let job = TrackerJob::new(
            config,
            SnapshotCollector::new(Arc::clone(&self.source)),
            DiffEngine::new(self.limits),
            Arc::clone(&self.sink),
        );
        let stats = job.stats();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(job.run(cancel.clone()));

        *active = Some(ActiveJob {
            config,
            started_at: Utc::now(),
            stats,
            _guard: cancel.clone().drop_guard(),
            cancel,
            handle,
        });

        info!(
            threshold = config.population_threshold(),
            interval_secs = config.poll_interval_seconds(),
            filter = %config.server_filter(),
            "world tracker started"
        );
        Ok(config)
    }

    /// Stop the running job.
    ///
    /// Returns once the job loop has observed cancellation and will start
    /// no further cycles. A fetch already in flight is not waited for.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotRunning`] if no job is live.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let mut active = self.active.lock().await;

        let job = match active.take() {
            Some(job) if job.is_live() => job,
            _ => return Err(LifecycleError::NotRunning),
        };

        let ActiveJob {
            cancel,
            handle,
            stats,
            ..
        } = job;
        cancel.cancel();

        if let Err(e) = handle.await {
            warn!(error = %e, "tracker task ended abnormally");
        }

        let stats = stats.snapshot();
        info!(
            cycles = stats.cycles_completed,
            failed_polls = stats.failed_polls,
            events = stats.events_emitted,
            "world tracker stopped"
        );
        Ok(())
    }

    /// Current state and, when running, the active configuration.
    pub async fn status(&self) -> TrackerStatus {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(job) if job.is_live() => TrackerStatus {
                state: TrackerState::Running,
                config: Some(job.config),
                started_at: Some(job.started_at),
                stats: Some(job.stats.snapshot()),
            },
            _ => TrackerStatus::idle(),
        }
    }

    /// Whether a job is live.
    pub async fn is_running(&self) -> bool {
        self.status().await.state == TrackerState::Running
    }
}
