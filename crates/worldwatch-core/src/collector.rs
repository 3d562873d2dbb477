//! Snapshot collection.
//!
//! A [`DataSource`] hands back the world list as raw text cells. The
//! [`SnapshotCollector`] normalizes those cells into a [`SnapshotSet`],
//! dropping individual rows that do not parse. Only a failure of the fetch
//! itself fails the poll.
//!
//! The collector never applies the server filter. The previous snapshot
//! must stay complete so a later job with a different filter still has
//! every world to compare against.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use worldwatch_types::{SnapshotSet, WorldId, WorldSnapshot};

use crate::error::{DataSourceError, RowParseError};

/// Prefixes the world list puts in front of world numbers.
const WORLD_LABEL_PREFIXES: [&str; 2] = ["OldSchool", "Old School"];

/// Suffix the world list puts after player counts.
const POPULATION_SUFFIX: &str = " players";

/// Type cell text that marks a members world.
const MEMBERS_LABEL: &str = "Members";

/// Row class fragment that marks a player-versus-player world.
const PVP_CLASS_MARKER: &str = "pvp";

/// One table row exactly as the source presented it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorldRow {
    /// World cell text, e.g. `OldSchool 301`.
    pub world: String,
    /// Population cell text, e.g. `1,020 players` or `812 players`.
    pub population: String,
    /// Type cell text, `Free` or `Members`.
    pub world_type: String,
    /// CSS class list of the row element.
    pub row_class: String,
}

impl RawWorldRow {
    /// Build a row from its four text fields.
    pub fn new(
        world: impl Into<String>,
        population: impl Into<String>,
        world_type: impl Into<String>,
        row_class: impl Into<String>,
    ) -> Self {
        Self {
            world: world.into(),
            population: population.into(),
            world_type: world_type.into(),
            row_class: row_class.into(),
        }
    }
}

/// Something that can fetch the current world population table.
///
/// Implementations own the transport. The returned future must be `Send`
/// because the tracker runs fetches on their own Tokio task.
pub trait DataSource: Send + Sync + 'static {
    /// Fetch every row of the population table.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] when the source is unreachable or the
    /// response does not contain a population table at all.
    fn fetch_population_table(
        &self,
    ) -> impl Future<Output = Result<Vec<RawWorldRow>, DataSourceError>> + Send;
}

/// Turns raw rows from a [`DataSource`] into a [`SnapshotSet`].
pub struct SnapshotCollector<S> {
    source: Arc<S>,
}

impl<S> Clone for SnapshotCollector<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: DataSource> SnapshotCollector<S> {
    /// Create a collector over a shared data source.
    pub const fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Poll the source once.
    ///
    /// Rows that fail to parse are skipped; a snapshot with some or even
    /// all rows missing is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError`] if the fetch itself failed.
    pub async fn collect(&self) -> Result<SnapshotSet, DataSourceError> {
        let rows = self.source.fetch_population_table().await?;
        let total_rows = rows.len();

        let mut skipped: usize = 0;
        let worlds: Vec<WorldSnapshot> = rows
            .iter()
            .filter_map(|row| {
                parse_row(row)
                    .inspect_err(|e| {
                        debug!(error = %e, world = %row.world, "skipping unparseable row");
                        skipped = skipped.saturating_add(1);
                    })
                    .ok()
            })
            .collect();

        if skipped > 0 {
            warn!(
                skipped_rows = skipped,
                total_rows,
                "population table contained unparseable rows"
            );
        }

        let snapshot = SnapshotSet::new(worlds);
        debug!(
            worlds = snapshot.len(),
            total_population = snapshot.total_population(),
            "snapshot collected"
        );
        Ok(snapshot)
    }
}

/// Normalize one raw row into a [`WorldSnapshot`].
///
/// # Errors
///
/// Returns [`RowParseError`] if the world number or population is not a
/// non-negative integer once labels are stripped.
pub fn parse_row(row: &RawWorldRow) -> Result<WorldSnapshot, RowParseError> {
    let world_text = strip_world_label(&row.world);
    let world_number: u32 = world_text
        .parse()
        .map_err(|source| RowParseError::WorldNumber {
            text: row.world.clone(),
            source,
        })?;

    let population: u32 = strip_population_label(&row.population)
        .parse()
        .map_err(|source| RowParseError::Population {
            text: row.population.clone(),
            source,
        })?;

    Ok(WorldSnapshot {
        world_id: WorldId(world_number),
        population,
        is_members_world: row.world_type.trim().eq_ignore_ascii_case(MEMBERS_LABEL),
        is_pvp_world: row.row_class.contains(PVP_CLASS_MARKER),
    })
}

fn strip_world_label(text: &str) -> &str {
    let trimmed = text.trim();
    WORLD_LABEL_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim()
}

/// Population cells may carry thousands separators.
fn strip_population_label(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_suffix(POPULATION_SUFFIX)
        .unwrap_or(trimmed)
        .trim()
        .replace(',', "")
}
