//! Error types for the runner binary.
//!
//! Covers what can go wrong before and around the tracker: reading the
//! environment, building the HTTP source, and driving the lifecycle.

use worldwatch_core::error::LifecycleError;

/// Errors that stop the runner process.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP data source could not be built.
    #[error("data source setup failed: {0}")]
    Source(String),

    /// Start or Stop was rejected.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Installing a shutdown signal handler failed.
    #[error("signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}
