//! Hand-off of finished cycles to readers.
//!
//! The scheduler builds a [`Snapshot`] privately and then publishes it with a
//! single pointer swap. HTTP handlers load whichever snapshot is current; a
//! reader holding an old `Arc` keeps a consistent view until it drops it.

use crate::aggregate::Aggregate;
use crate::errors::Result;
use crate::report::{chart_data_json, HtmlReport};
use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One complete cycle plus its materialized HTML and JSON.
#[derive(Debug)]
pub struct Snapshot {
    pub cycle: u64,
    pub completed_at: DateTime<Utc>,
    pub aggregate: Aggregate,
    pub html: String,
    pub data_json: String,
}

impl Snapshot {
    /// Render both served documents for `aggregate`.
    pub fn materialize(
        cycle: u64,
        completed_at: DateTime<Utc>,
        aggregate: Aggregate,
        bug_link_base: &str,
    ) -> Result<Self> {
        let data_json = chart_data_json(&aggregate)?;
        let html = HtmlReport::new(bug_link_base).render(&aggregate, cycle, completed_at);
        Ok(Self {
            cycle,
            completed_at,
            aggregate,
            html,
            data_json,
        })
    }
}

/// The currently servable snapshot, empty until the first cycle completes.
#[derive(Debug, Default)]
pub struct ReportStore {
    current: ArcSwapOption<Snapshot>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot, returning the one it displaced.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        self.current.swap(Some(snapshot))
    }

    pub fn load(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }
}
