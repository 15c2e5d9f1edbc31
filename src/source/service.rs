//! Supersession guard for overlapping chart fetches.
//!
//! A filter change can arrive while the previous fetch is still in
//! flight. Rather than cancel, each request is tagged with an id
//! captured at request time; when a result arrives, it is applied
//! only if its tag still matches the fetcher's current tag. The
//! most-recently-requested result is therefore always the one
//! displayed, and a stale response can never overwrite a newer one.
//!
//! Each chart instance owns its own fetcher; nothing is shared
//! between charts, and a failure here stays local to the chart.

use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::ChartQuery;
use crate::source::DataSource;
use crate::transform::pipeline::ChartData;

/// Identity of one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    id: Uuid,
}

/// What became of a fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The result is current and should be displayed.
    Applied(ChartData),
    /// A newer request started while this one was in flight; the
    /// result was discarded.
    Superseded,
    /// The fetch or transform failed. No retry: the error state
    /// stands until the next filter action.
    Failed(PipelineError),
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchOutcome::Superseded)
    }
}

/// Per-chart fetch coordinator.
#[derive(Debug, Clone)]
pub struct ChartFetcher {
    source: Arc<DataSource>,
    current: Arc<Mutex<Option<Uuid>>>,
}

impl ChartFetcher {
    pub fn new(source: DataSource) -> Self {
        Self {
            source: Arc::new(source),
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Start a request for a query, superseding any request in
    /// flight. Returns the tag the eventual result must carry.
    pub fn begin(&self) -> RequestTag {
        let tag = RequestTag { id: Uuid::new_v4() };
        let mut current = self.current.lock().expect("fetcher lock");
        *current = Some(tag.id);
        tag
    }

    /// Whether a tag still identifies the current request.
    pub fn is_current(&self, tag: RequestTag) -> bool {
        let current = self.current.lock().expect("fetcher lock");
        *current == Some(tag.id)
    }

    /// Fetch and transform, applying the result only if no newer
    /// request superseded this one while it ran.
    pub async fn fetch(&self, query: ChartQuery) -> FetchOutcome {
        let tag = self.begin();
        let outcome = self.source.fetch_chart(&query).await;

        if !self.is_current(tag) {
            return FetchOutcome::Superseded;
        }

        match outcome {
            Ok(chart) => FetchOutcome::Applied(chart),
            Err(err) => FetchOutcome::Failed(err),
        }
    }
}
