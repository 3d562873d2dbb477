//! A scripted data source.
//!
//! [`ScriptedSource`] replays a queue of canned polls, then keeps
//! returning the last successful table. It lets the tracker run end to
//! end without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::collector::{DataSource, RawWorldRow};
use crate::error::DataSourceError;

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<Result<Vec<RawWorldRow>, DataSourceError>>,
    last_table: Option<Vec<RawWorldRow>>,
}

/// A data source that replays queued results.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<Script>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    /// Create a source with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful poll.
    pub async fn push_rows(&self, rows: Vec<RawWorldRow>) {
        self.script.lock().await.queued.push_back(Ok(rows));
    }

    /// Queue a failed poll.
    pub async fn push_failure(&self, error: DataSourceError) {
        self.script.lock().await.queued.push_back(Err(error));
    }

    /// How many times the table has been fetched.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Acquire)
    }
}

impl DataSource for ScriptedSource {
    async fn fetch_population_table(&self) -> Result<Vec<RawWorldRow>, DataSourceError> {
        self.fetches.fetch_add(1, Ordering::AcqRel);
        let mut script = self.script.lock().await;
        match script.queued.pop_front() {
            Some(Ok(rows)) => {
                script.last_table = Some(rows.clone());
                Ok(rows)
            }
            Some(Err(e)) => Err(e),
            None => script.last_table.clone().ok_or_else(|| {
                DataSourceError::Unreachable("scripted source has nothing queued".to_owned())
            }),
        }
    }
}
