//! Error types for the tracker core.
//!
//! Nothing here is fatal to the host process. Data source failures cost
//! one cycle, row failures cost one row, and config or lifecycle errors
//! are returned to whoever called Start or Stop.

use std::num::ParseIntError;

use worldwatch_types::ParseServerFilterError;

/// A poll of the data source failed as a whole.
#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    /// The source could not be reached (DNS, connect, TLS, timeout).
    #[error("data source unreachable: {0}")]
    Unreachable(String),

    /// The source answered with a non-success status.
    #[error("data source returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The response did not contain a recognizable population table.
    #[error("population table not recognized: {0}")]
    Malformed(String),

    /// The task running the fetch panicked or was aborted.
    #[error("fetch task failed: {0}")]
    Task(String),
}

/// A single table row could not be turned into a world snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowParseError {
    /// The world cell did not hold a world number.
    #[error("invalid world number {text:?}: {source}")]
    WorldNumber {
        /// The cell text as received.
        text: String,
        /// Why the number did not parse.
        source: ParseIntError,
    },

    /// The population cell did not hold a player count.
    #[error("invalid population {text:?}: {source}")]
    Population {
        /// The cell text as received.
        text: String,
        /// Why the count did not parse.
        source: ParseIntError,
    },
}

/// Tracker options were rejected before a job was created.
#[derive(Debug, thiserror::Error)]
pub enum InvalidConfigError {
    /// The poll interval is below the minimum.
    #[error("poll interval must be at least {minimum} seconds (got {given})")]
    PollIntervalTooShort {
        /// Requested interval in seconds.
        given: u64,
        /// Minimum accepted interval in seconds.
        minimum: u64,
    },

    /// The population threshold is below the minimum.
    #[error("population threshold must be at least {minimum} (got {given})")]
    ThresholdTooLow {
        /// Requested threshold.
        given: u32,
        /// Minimum accepted threshold.
        minimum: u32,
    },

    /// The server filter is not `f2p`, `p2p` or `all`.
    #[error("{source}")]
    UnknownServerFilter {
        /// The underlying parse error.
        #[from]
        source: ParseServerFilterError,
    },
}

/// A Start, Stop or Status call was not valid in the current state.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Start was called while a job is running.
    #[error(
        "world tracker is already running; stop the current instance before starting a new one"
    )]
    AlreadyRunning,

    /// Stop was called with no job running.
    #[error("world tracker is not running; start it before stopping it")]
    NotRunning,

    /// Start was called with options that failed validation.
    #[error("invalid tracker config: {0}")]
    InvalidConfig(#[from] InvalidConfigError),
}
