//! HTTP data source for the public world list page.
//!
//! The page carries one `<tbody class="server-list__body">` with a
//! `<tr class="server-list__row ...">` per world. Cells are, in order:
//! world, population, location, type, activity. Extraction is a handful of
//! regular expressions over the markup; anything inside a cell that looks
//! like a tag is stripped before the text is handed to the collector.

use std::time::Duration;

use regex::Regex;
use tracing::debug;
use worldwatch_core::collector::{DataSource, RawWorldRow};
use worldwatch_core::error::DataSourceError;

use crate::error::RunnerError;

const USER_AGENT: &str = concat!("worldwatch/", env!("CARGO_PKG_VERSION"));

/// Compiled patterns for pulling rows out of the world list markup.
#[derive(Debug, Clone)]
pub struct RowExtractor {
    body: Regex,
    row: Regex,
    cell: Regex,
    tag: Regex,
    space: Regex,
}

impl RowExtractor {
    /// Compile the extraction patterns.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            body: Regex::new(
                r#"(?is)<tbody[^>]*class="[^"]*\bserver-list__body\b[^"]*"[^>]*>(.*?)</tbody>"#,
            )?,
            row: Regex::new(
                r#"(?is)<tr[^>]*class="([^"]*\bserver-list__row\b[^"]*)"[^>]*>(.*?)</tr>"#,
            )?,
            cell: Regex::new(r"(?is)<td[^>]*>(.*?)</td>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            space: Regex::new(r"\s+")?,
        })
    }

    /// Extract every world row from a full page.
    ///
    /// Rows with missing cells are returned with empty text in those cells
    /// and left for the collector to reject.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::Malformed`] if the page has no world list
    /// table.
    pub fn parse_population_table(&self, html: &str) -> Result<Vec<RawWorldRow>, DataSourceError> {
        let body = self
            .body
            .captures(html)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                DataSourceError::Malformed("no server-list__body table in page".to_owned())
            })?;

        let rows = self
            .row
            .captures_iter(body.as_str())
            .map(|captures| {
                let class = captures.get(1).map_or("", |m| m.as_str());
                let inner = captures.get(2).map_or("", |m| m.as_str());
                let cells: Vec<String> = self
                    .cell
                    .captures_iter(inner)
                    .map(|c| self.cell_text(c.get(1).map_or("", |m| m.as_str())))
                    .collect();
                let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();

                RawWorldRow::new(cell(0), cell(1), cell(3), class)
            })
            .collect::<Vec<_>>();

        debug!(rows = rows.len(), "world list rows extracted");
        Ok(rows)
    }

    fn cell_text(&self, raw: &str) -> String {
        let stripped = self.tag.replace_all(raw, " ");
        let decoded = stripped
            .replace("&nbsp;", " ")
            .replace("&#160;", " ")
            .replace("&amp;", "&");
        self.space.replace_all(decoded.trim(), " ").into_owned()
    }
}

/// Fetches the world list over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPopulationSource {
    client: reqwest::Client,
    url: String,
    extractor: RowExtractor,
}

impl HttpPopulationSource {
    /// Build a source for `url` with a per-request deadline.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Source`] if the HTTP client or the row
    /// patterns cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RunnerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RunnerError::Source(format!("http client: {e}")))?;
        let extractor =
            RowExtractor::new().map_err(|e| RunnerError::Source(format!("row patterns: {e}")))?;

        Ok(Self {
            client,
            url: url.to_owned(),
            extractor,
        })
    }
}

impl DataSource for HttpPopulationSource {
    async fn fetch_population_table(&self) -> Result<Vec<RawWorldRow>, DataSourceError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                DataSourceError::Unreachable(format!("request to {} timed out", self.url))
            } else {
                DataSourceError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::Status {
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| DataSourceError::Unreachable(format!("reading body failed: {e}")))?;

        self.extractor.parse_population_table(&html)
    }
}
