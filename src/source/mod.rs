//! Tabular data source: file layout and fetching.
//!
//! One CSV file exists per (metric family, chart type, granularity,
//! entity) combination, addressed by the path template
//! `<base>/<category>/<chart-type>/<granularity>/<metric>_<entity><id>.csv`.
//! This module resolves queries to paths, fetches bytes with a
//! defensive time bound, and runs the full fetch-parse-transform
//! chain for a query.
//!
//! The supersession guard for overlapping requests lives in
//! [`service`].

pub mod service;

pub use service::{ChartFetcher, FetchOutcome, RequestTag};

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PipelineOutcome, SourceError, SourceResult};
use crate::logs::log_info;
use crate::models::{ChartKind, ChartQuery, EntityRef, TimeRange};
use crate::parser::parse_bytes_auto;
use crate::transform::pipeline::{transform_parsed, ChartData};

/// Environment variable naming the data base directory.
pub const DATA_DIR_ENV: &str = "COMFORTVIZ_DATA_DIR";

/// Default base directory when the environment does not say.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default fetch time bound, so a dead filesystem cannot leave a
/// chart loading forever.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves chart queries to data files and fetches them.
#[derive(Debug, Clone)]
pub struct DataSource {
    base_dir: PathBuf,
    timeout: Duration,
}

impl DataSource {
    /// Source rooted at an explicit base directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Source rooted at `COMFORTVIZ_DATA_DIR`, falling back to `data`.
    pub fn from_env() -> Self {
        let base = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(base)
    }

    /// Override the fetch time bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve the data file path for a query.
    pub fn resolve(&self, query: &ChartQuery) -> PathBuf {
        self.base_dir
            .join(query.kind.category())
            .join(query.kind.chart_dir())
            .join(query.range.as_code())
            .join(file_name(query))
    }

    /// Fetch the raw bytes for a query, bounded by the timeout.
    ///
    /// A missing or empty file is a "no data" condition, not an IO
    /// failure; see [`crate::error::PipelineError::is_no_data`].
    pub async fn fetch(&self, query: &ChartQuery) -> SourceResult<Vec<u8>> {
        let path = self.resolve(query);
        log_info(format!("Fetching {}", path.display()));

        let read = tokio::fs::read(&path);
        let bytes = match tokio::time::timeout(self.timeout, read).await {
            Err(_) => return Err(SourceError::Timeout(self.timeout.as_millis() as u64)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(path.display().to_string()))
            }
            Ok(Err(e)) => return Err(SourceError::Io(e)),
            Ok(Ok(bytes)) => bytes,
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(SourceError::Empty(path.display().to_string()));
        }

        Ok(bytes)
    }

    /// Full chain for one chart: fetch, parse, normalize, transform.
    pub async fn fetch_chart(&self, query: &ChartQuery) -> PipelineOutcome<ChartData> {
        let bytes = self.fetch(query).await?;
        let parsed = parse_bytes_auto(&bytes)?;
        transform_parsed(&parsed, query)
    }

    /// Entities that have a data file for the given chart and range.
    pub async fn available_entities(
        &self,
        kind: ChartKind,
        range: TimeRange,
    ) -> SourceResult<Vec<EntityRef>> {
        let dir = self
            .base_dir
            .join(kind.category())
            .join(kind.chart_dir())
            .join(range.as_code());

        let mut entities = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if let Some((_, entity)) = parse_file_name(name) {
                    entities.push(entity);
                }
            }
        }
        Ok(entities)
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::from_env()
    }
}

/// File name for a query, per the path template.
fn file_name(query: &ChartQuery) -> String {
    format!(
        "{}_{}.csv",
        metric_name(query.kind, query.range),
        query.entity.file_fragment()
    )
}

/// Metric-name fragment of the file template.
///
/// The zone charts are aggregated from fixed windows named by the
/// aggregation step (May for the month view, the trailing quarter
/// otherwise); the floor charts carry their metric family name.
fn metric_name(kind: ChartKind, range: TimeRange) -> &'static str {
    match kind {
        ChartKind::Heatmap | ChartKind::BoxPlot => match range {
            TimeRange::Quarter => "lastquarter",
            _ => "may",
        },
        ChartKind::ComfortTrends => "comftrends",
        ChartKind::Co2Trends => "co2trends",
        ChartKind::Co2History => "co2history",
    }
}

static FILE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9]+)_(zone|floor)(\d+)\.csv$").expect("valid pattern")
});

/// Parse a data file name back into its metric fragment and entity.
///
/// Names outside the template (or entities outside the monitored
/// domains) return `None`.
pub fn parse_file_name(name: &str) -> Option<(String, EntityRef)> {
    let captures = FILE_NAME_RE.captures(name)?;
    let metric = captures.get(1)?.as_str().to_string();
    let id: u32 = captures.get(3)?.as_str().parse().ok()?;

    let entity = match captures.get(2)?.as_str() {
        "zone" => EntityRef::zone(id).ok()?,
        "floor" => EntityRef::floor(id).ok()?,
        _ => return None,
    };

    Some((metric, entity))
}
