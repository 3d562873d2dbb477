//! Configuration for the runner.
//!
//! Everything comes from environment variables; every variable is optional.
//! Tracker options are passed through unvalidated: the controller rejects
//! bad ones on Start.

use std::time::Duration;

use worldwatch_core::config::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POPULATION_THRESHOLD, DEFAULT_SERVER_FILTER,
    TrackerOptions,
};

use crate::error::RunnerError;

/// Public world list page.
pub const DEFAULT_SOURCE_URL: &str = "https://oldschool.runescape.com/slu";

/// HTTP request deadline in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Complete runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// URL of the world list page.
    pub source_url: String,
    /// Deadline for one fetch of the world list.
    pub request_timeout: Duration,
    /// Options handed to Start.
    pub tracker: TrackerOptions,
    /// Log output format.
    pub log_format: LogFormat,
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `WORLDWATCH_SOURCE_URL` -- world list page (default `https://oldschool.runescape.com/slu`)
    /// - `WORLDWATCH_REQUEST_TIMEOUT_MS` -- fetch deadline in milliseconds (default 10000)
    /// - `WORLDWATCH_THRESHOLD` -- minimum population change to report (default 12)
    /// - `WORLDWATCH_INTERVAL_SECS` -- seconds between polls (default 12)
    /// - `WORLDWATCH_FILTER` -- `f2p`, `p2p` or `all` (default `f2p`)
    /// - `LOG_FORMAT` -- `pretty` or `json` (default `pretty`)
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if a numeric variable does not parse
    /// or `LOG_FORMAT` is unknown.
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let source_url =
            lookup("WORLDWATCH_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_owned());

        let request_timeout_ms: u64 = parse_var(
            &lookup,
            "WORLDWATCH_REQUEST_TIMEOUT_MS",
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?;
        let population_threshold: u32 = parse_var(
            &lookup,
            "WORLDWATCH_THRESHOLD",
            DEFAULT_POPULATION_THRESHOLD,
        )?;
        let poll_interval_seconds: u64 = parse_var(
            &lookup,
            "WORLDWATCH_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;

        let server_filter =
            lookup("WORLDWATCH_FILTER").unwrap_or_else(|| DEFAULT_SERVER_FILTER.to_owned());

        let log_format = match lookup("LOG_FORMAT")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("pretty" | "text" | "") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(RunnerError::Config(format!(
                    "unknown LOG_FORMAT: {other}"
                )));
            }
        };

        Ok(Self {
            source_url,
            request_timeout: Duration::from_millis(request_timeout_ms),
            tracker: TrackerOptions {
                population_threshold,
                poll_interval_seconds,
                server_filter,
            },
            log_format,
        })
    }
}

/// Read a numeric variable, falling back to `default` when unset.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, RunnerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid {name}: {e}"))),
    }
}
