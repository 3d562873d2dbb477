//! Process entry point for the world population tracker.
//!
//! Loads configuration from the environment, starts one tracker job over
//! the public world list page, and stops it cleanly on Ctrl-C or SIGTERM.
//!
//! # Architecture
//!
//! ```text
//! world list page --> HttpPopulationSource --> TrackerJob --> LogSink
//!                                                 ^
//!                              LifecycleController (start / stop)
//! ```

mod config;
mod error;
mod sink;
mod source;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use worldwatch_core::controller::LifecycleController;

use crate::config::{LogFormat, RunnerConfig};
use crate::error::RunnerError;
use crate::sink::LogSink;
use crate::source::HttpPopulationSource;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the tracker refuses to
/// start, or the shutdown signal handler cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RunnerConfig::from_env()?;
    init_tracing(config.log_format);

    info!(
        source_url = %config.source_url,
        request_timeout_ms = config.request_timeout.as_millis(),
        "worldwatch-runner starting"
    );

    let source = HttpPopulationSource::new(&config.source_url, config.request_timeout)?;
    let controller = LifecycleController::new(Arc::new(source), Arc::new(LogSink));

    let tracker = controller
        .start(&config.tracker)
        .await
        .map_err(RunnerError::from)?;
    info!(
        threshold = tracker.population_threshold(),
        interval_secs = tracker.poll_interval_seconds(),
        filter = %tracker.server_filter(),
        "tracking world populations, press Ctrl-C to stop"
    );

    shutdown_signal().await?;
    info!("shutdown signal received");

    controller.stop().await.map_err(RunnerError::from)?;
    info!("worldwatch-runner stopped");
    Ok(())
}

/// Initialize structured logging from `RUST_LOG` (default `info`).
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<(), RunnerError> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
