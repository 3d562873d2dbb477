//! End-to-end tests for the lifecycle controller.
//!
//! Every test runs on a paused Tokio clock, so poll intervals elapse
//! instantly whenever the runtime is otherwise idle.

#![allow(clippy::unwrap_used)]

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc::error::TryRecvError;
use worldwatch_core::collector::{DataSource, RawWorldRow};
use worldwatch_core::config::TrackerOptions;
use worldwatch_core::controller::LifecycleController;
use worldwatch_core::error::{DataSourceError, LifecycleError};
use worldwatch_core::sink::ChannelSink;
use worldwatch_core::stub::ScriptedSource;
use worldwatch_types::{SpikeEvent, SpikeReport, TrackerState, WorldId};

fn free_world(world: u32, population: u32) -> RawWorldRow {
    RawWorldRow::new(
        format!("OldSchool {world}"),
        format!("{population} players"),
        "Free",
        "server-list__row",
    )
}

fn options(threshold: u32, filter: &str) -> TrackerOptions {
    TrackerOptions {
        population_threshold: threshold,
        poll_interval_seconds: 10,
        server_filter: filter.to_owned(),
    }
}

/// A source whose fetch never completes.
#[derive(Default)]
struct StalledSource {
    fetches: AtomicUsize,
}

impl DataSource for StalledSource {
    fn fetch_population_table(
        &self,
    ) -> impl Future<Output = Result<Vec<RawWorldRow>, DataSourceError>> + Send {
        self.fetches.fetch_add(1, Ordering::AcqRel);
        std::future::pending()
    }
}

/// A source whose fetch succeeds after a fixed delay.
struct SlowSource {
    delay: Duration,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl SlowSource {
    const fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }
}

impl DataSource for SlowSource {
    async fn fetch_population_table(&self) -> Result<Vec<RawWorldRow>, DataSourceError> {
        self.started.fetch_add(1, Ordering::AcqRel);
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::AcqRel);
        Ok(vec![free_world(1, 100)])
    }
}

#[tokio::test(start_paused = true)]
async fn reports_spike_after_baseline() {
    let source = Arc::new(ScriptedSource::new());
    source.push_rows(vec![free_world(1, 100)]).await;
    source.push_rows(vec![free_world(1, 115)]).await;
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "all")).await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), SpikeReport::empty());
    assert_eq!(
        rx.recv().await.unwrap(),
        SpikeReport::Spikes {
            events: vec![SpikeEvent {
                world_id: WorldId(1),
                delta: 15,
                is_members_world: false,
                is_pvp_world: false,
            }],
        }
    );
    // The source now repeats the last table: nothing changes.
    assert!(rx.recv().await.unwrap().is_empty());

    let status = controller.status().await;
    assert_eq!(status.state, TrackerState::Running);
    let stats = status.stats.unwrap();
    assert!(stats.cycles_completed >= 2);
    assert_eq!(stats.events_emitted, 1);

    controller.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn threshold_above_delta_reports_nothing() {
    let source = Arc::new(ScriptedSource::new());
    source.push_rows(vec![free_world(1, 100)]).await;
    source.push_rows(vec![free_world(1, 115)]).await;
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(20, "all")).await.unwrap();
    assert!(rx.recv().await.unwrap().is_empty());
    assert!(rx.recv().await.unwrap().is_empty());
    controller.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn mass_spike_collapses_to_summary() {
    let source = Arc::new(ScriptedSource::new());
    source
        .push_rows((1..=50).map(|w| free_world(w, 100)).collect())
        .await;
    source
        .push_rows((1..=50).map(|w| free_world(w, 140)).collect())
        .await;
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "f2p")).await.unwrap();
    assert!(rx.recv().await.unwrap().is_empty());
    assert_eq!(
        rx.recv().await.unwrap(),
        SpikeReport::Collapsed {
            count: 50,
            threshold: 10,
        }
    );
    controller.stop().await.unwrap();
    assert_eq!(controller.status().await.state, TrackerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn no_cycles_after_stop() {
    let source = Arc::new(ScriptedSource::new());
    source.push_rows(vec![free_world(1, 100)]).await;
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "all")).await.unwrap();
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();

    controller.stop().await.unwrap();
    while rx.try_recv().is_ok() {}
    let fetched = source.fetch_count();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(source.fetch_count(), fetched);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn stop_does_not_wait_for_stalled_fetch() {
    let source = Arc::new(StalledSource::default());
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "all")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.fetches.load(Ordering::Acquire), 1);

    tokio::time::timeout(Duration::from_secs(1), controller.stop())
        .await
        .unwrap()
        .unwrap();

    // The stalled cycle never reached the sink.
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(controller.status().await.state, TrackerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn late_fetch_result_is_discarded_after_stop() {
    let source = Arc::new(SlowSource::new(Duration::from_secs(5)));
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "all")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.started.load(Ordering::Acquire), 1);
    assert_eq!(source.completed.load(Ordering::Acquire), 0);

    controller.stop().await.unwrap();

    // Let the abandoned fetch finish well past its delay.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.completed.load(Ordering::Acquire), 1);
    assert_eq!(source.started.load(Ordering::Acquire), 1);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(controller.status().await.state, TrackerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn failed_polls_do_not_stop_the_job() {
    let source = Arc::new(ScriptedSource::new());
    source.push_rows(vec![free_world(1, 100)]).await;
    source
        .push_failure(DataSourceError::Status { status: 502 })
        .await;
    source.push_rows(vec![free_world(1, 90)]).await;
    let (sink, mut rx) = ChannelSink::new();
    let controller = LifecycleController::new(Arc::clone(&source), Arc::new(sink));

    controller.start(&options(10, "f2p")).await.unwrap();
    assert!(rx.recv().await.unwrap().is_empty());
    assert!(rx.recv().await.unwrap().is_empty());
    assert_eq!(rx.recv().await.unwrap().spike_count(), 1);

    let stats = controller.status().await.stats.unwrap();
    assert_eq!(stats.failed_polls, 1);
    controller.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn concurrent_starts_admit_one_job() {
    let source = Arc::new(ScriptedSource::new());
    let (sink, _rx) = ChannelSink::new();
    let controller = Arc::new(LifecycleController::new(source, Arc::new(sink)));

    let a = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.start(&TrackerOptions::default()).await }
    });
    let b = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.start(&TrackerOptions::default()).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let started = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(LifecycleError::AlreadyRunning)))
        .count();
    assert_eq!((started, rejected), (1, 1));

    controller.stop().await.unwrap();
    assert!(matches!(
        controller.stop().await,
        Err(LifecycleError::NotRunning)
    ));
}
