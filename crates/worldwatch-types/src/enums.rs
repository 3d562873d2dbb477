//! Enumeration types for the tracker.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Server filter
// ---------------------------------------------------------------------------

/// Which worlds a tracker reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerFilter {
    /// Free-to-play worlds only.
    F2p,
    /// Members (pay-to-play) worlds only.
    P2p,
    /// Every world.
    All,
}

impl ServerFilter {
    /// Whether a world with the given membership flag passes this filter.
    pub const fn accepts(self, is_members_world: bool) -> bool {
        match self {
            Self::F2p => !is_members_world,
            Self::P2p => is_members_world,
            Self::All => true,
        }
    }

    /// Upper-case name used in logs and rendered messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::F2p => "F2P",
            Self::P2p => "P2P",
            Self::All => "ALL",
        }
    }
}

impl core::fmt::Display for ServerFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when filter text is not one of `f2p`, `p2p` or `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseServerFilterError {
    /// The rejected input, as given.
    pub input: String,
}

impl core::fmt::Display for ParseServerFilterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "unknown server filter {:?} (expected f2p, p2p or all)",
            self.input
        )
    }
}

impl std::error::Error for ParseServerFilterError {}

impl FromStr for ServerFilter {
    type Err = ParseServerFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f2p" => Ok(Self::F2p),
            "p2p" => Ok(Self::P2p),
            "all" => Ok(Self::All),
            _ => Err(ParseServerFilterError {
                input: s.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker state
// ---------------------------------------------------------------------------

/// Lifecycle state of a tracker controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackerState {
    /// No job is active.
    #[default]
    Idle,
    /// A job is polling in the background.
    Running,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("f2p".parse::<ServerFilter>().unwrap(), ServerFilter::F2p);
        assert_eq!("P2P".parse::<ServerFilter>().unwrap(), ServerFilter::P2p);
        assert_eq!(" All ".parse::<ServerFilter>().unwrap(), ServerFilter::All);
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let err = "members".parse::<ServerFilter>().unwrap_err();
        assert_eq!(err.input, "members");
        assert!(err.to_string().contains("members"));
    }

    #[test]
    fn filter_membership_rules() {
        assert!(ServerFilter::F2p.accepts(false));
        assert!(!ServerFilter::F2p.accepts(true));
        assert!(ServerFilter::P2p.accepts(true));
        assert!(!ServerFilter::P2p.accepts(false));
        assert!(ServerFilter::All.accepts(true));
        assert!(ServerFilter::All.accepts(false));
    }

    #[test]
    fn filter_serializes_upper_case() {
        let json = serde_json::to_string(&ServerFilter::F2p).unwrap();
        assert_eq!(json, "\"F2P\"");
    }
}
