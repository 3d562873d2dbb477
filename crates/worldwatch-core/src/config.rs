//! Tracker configuration.
//!
//! A command adapter (chat command, env vars, CLI) fills in
//! [`TrackerOptions`]. The controller validates them into a
//! [`TrackerConfig`] on Start; a job only ever sees the validated form.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use worldwatch_types::ServerFilter;

use crate::error::InvalidConfigError;
use crate::limits::{MIN_POLL_INTERVAL_SECS, MIN_POPULATION_THRESHOLD};

/// Default population threshold when the caller gives none.
pub const DEFAULT_POPULATION_THRESHOLD: u32 = 12;

/// Default poll interval in seconds when the caller gives none.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 12;

/// Default server filter when the caller gives none.
pub const DEFAULT_SERVER_FILTER: &str = "f2p";

/// Unvalidated tracker settings as supplied by a command adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerOptions {
    /// Minimum absolute population change to report.
    pub population_threshold: u32,
    /// Seconds between polls.
    pub poll_interval_seconds: u64,
    /// `f2p`, `p2p` or `all`, any case.
    pub server_filter: String,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            population_threshold: DEFAULT_POPULATION_THRESHOLD,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECS,
            server_filter: DEFAULT_SERVER_FILTER.to_owned(),
        }
    }
}

impl TrackerOptions {
    /// Check the options against the process floors.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfigError`] if the interval or threshold is below
    /// its floor, or the filter text is not recognized.
    pub fn validate(&self) -> Result<TrackerConfig, InvalidConfigError> {
        let filter = self.server_filter.parse::<ServerFilter>()?;
        TrackerConfig::new(
            self.population_threshold,
            self.poll_interval_seconds,
            filter,
        )
    }
}

/// Validated, immutable configuration for one tracker job.
///
/// Only constructible through [`TrackerConfig::new`] or
/// [`TrackerOptions::validate`], so it is serializable but not
/// deserializable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackerConfig {
    population_threshold: u32,
    poll_interval_seconds: u64,
    server_filter: ServerFilter,
}

impl TrackerConfig {
    /// Build a config, enforcing the minimum interval and threshold.
    ///
    /// Values equal to a floor are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfigError::PollIntervalTooShort`] or
    /// [`InvalidConfigError::ThresholdTooLow`].
    pub const fn new(
        population_threshold: u32,
        poll_interval_seconds: u64,
        server_filter: ServerFilter,
    ) -> Result<Self, InvalidConfigError> {
        if poll_interval_seconds < MIN_POLL_INTERVAL_SECS {
            return Err(InvalidConfigError::PollIntervalTooShort {
                given: poll_interval_seconds,
                minimum: MIN_POLL_INTERVAL_SECS,
            });
        }
        if population_threshold < MIN_POPULATION_THRESHOLD {
            return Err(InvalidConfigError::ThresholdTooLow {
                given: population_threshold,
                minimum: MIN_POPULATION_THRESHOLD,
            });
        }
        Ok(Self {
            population_threshold,
            poll_interval_seconds,
            server_filter,
        })
    }

    /// Minimum absolute delta that counts as a spike.
    pub const fn population_threshold(&self) -> u32 {
        self.population_threshold
    }

    /// Seconds between polls.
    pub const fn poll_interval_seconds(&self) -> u64 {
        self.poll_interval_seconds
    }

    /// Seconds between polls as a [`Duration`].
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Which worlds are reported.
    pub const fn server_filter(&self) -> ServerFilter {
        self.server_filter
    }
}
