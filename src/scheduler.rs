//! Refresh cycles and their schedule.
//!
//! A cycle fetches pages from cursor 0 upward until a page comes back
//! shorter than the ceiling, folding every page into one [`Aggregator`].
//! Only a cycle that reaches its final page is published; any fatal failure
//! leaves the previous snapshot in place.
//!
//! ```text
//!             tick                      full page
//!   Idle ───────────────▶ FetchingPage ◀──────────┐
//!    ▲                      │    │                │
//!    │ failure              │    └────────────────┘
//!    └──────────────────────┤
//!                           │ short page (publish)
//!                           ▼
//!                     CycleComplete ──── tick ───▶ FetchingPage
//! ```
//!
//! Cycles run inline in the scheduler task, so at most one is ever in
//! flight. A tick that comes due while a cycle is still running is skipped.

use crate::aggregate::{Aggregate, Aggregator, PageBoundary};
use crate::config::BugdashConfig;
use crate::decode::decode_page;
use crate::errors::{Error, Result};
use crate::export::write_records_csv;
use crate::fetch::PageSource;
use crate::publish::{ReportStore, Snapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Where the scheduler is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CycleState {
    /// Nothing running and nothing published by the latest attempt.
    Idle,
    /// Processing page `page` (1-based) of the current cycle.
    FetchingPage { page: u32, cursor: u64 },
    /// Cycle `cycle` finished and was published.
    CycleComplete { cycle: u64 },
}

/// Fetch, decode and fold pages until the final page.
///
/// `on_page` is called before each fetch with the 1-based page number and
/// the cursor the page is requested with.
pub async fn run_cycle<S, F>(source: &S, ceiling: usize, mut on_page: F) -> Result<Aggregate>
where
    S: PageSource + ?Sized,
    F: FnMut(u32, u64),
{
    let mut aggregator = Aggregator::new();
    let mut page = 0u32;

    loop {
        page += 1;
        let cursor = aggregator.cursor();
        on_page(page, cursor);

        let body = source.fetch_page(cursor).await?;
        let summary = aggregator.fold_page(decode_page(body.as_slice())?);
        info!(
            page,
            cursor,
            decoded = summary.decoded,
            skipped = summary.skipped,
            next_cursor = aggregator.cursor(),
            "page folded"
        );

        match PageBoundary::classify(summary.rows(), ceiling) {
            PageBoundary::Final => {
                debug!(pages = page, "short page, cycle complete");
                return Ok(aggregator.finish());
            }
            PageBoundary::More if aggregator.cursor() <= cursor => {
                return Err(Error::StalledCursor { cursor });
            }
            PageBoundary::More => {}
        }
    }
}

/// What the scheduler needs from the configuration.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub interval: Duration,
    pub page_ceiling: usize,
    pub bug_link_base: String,
    pub export_path: Option<PathBuf>,
}

impl From<&BugdashConfig> for SchedulerSettings {
    fn from(config: &BugdashConfig) -> Self {
        Self {
            interval: config.schedule.interval(),
            page_ceiling: config.upstream.page_ceiling,
            bug_link_base: config.upstream.bug_link_base.clone(),
            export_path: config.export.path.clone(),
        }
    }
}

/// Bookkeeping about the most recent outcomes, for `/status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleHistory {
    pub attempts: u64,
    pub published: u64,
    pub last_failure: Option<String>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// Owns the page source and drives cycles on a fixed interval.
pub struct Scheduler<S> {
    source: S,
    settings: SchedulerSettings,
    store: Arc<ReportStore>,
    state: watch::Sender<CycleState>,
    history: Arc<parking_lot::RwLock<CycleHistory>>,
    cycles: u64,
}

impl<S: PageSource> Scheduler<S> {
    pub fn new(source: S, settings: SchedulerSettings, store: Arc<ReportStore>) -> Self {
        let (state, _) = watch::channel(CycleState::Idle);
        Self {
            source,
            settings,
            store,
            state,
            history: Arc::default(),
            cycles: 0,
        }
    }

    pub fn state(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    pub fn history(&self) -> Arc<parking_lot::RwLock<CycleHistory>> {
        Arc::clone(&self.history)
    }

    pub fn store(&self) -> Arc<ReportStore> {
        Arc::clone(&self.store)
    }

    /// Run one full cycle and publish it on success.
    ///
    /// A failure is logged and returned; the previously published snapshot
    /// stays servable and the state goes back to `Idle`.
    pub async fn run_once(&mut self) -> Result<Arc<Snapshot>> {
        self.cycles += 1;
        let cycle = self.cycles;
        self.history.write().attempts += 1;

        let span = info_span!("cycle", cycle);
        let outcome = self.run_cycle_and_publish(cycle).instrument(span).await;

        match &outcome {
            Ok(_) => {
                self.history.write().published += 1;
                self.state.send_replace(CycleState::CycleComplete { cycle });
            }
            Err(err) => {
                error!(cycle, class = %err.class(), error = %err, "cycle failed, keeping last report");
                let mut history = self.history.write();
                history.last_failure = Some(err.to_string());
                history.last_failure_at = Some(Utc::now());
                drop(history);
                self.state.send_replace(CycleState::Idle);
            }
        }
        outcome
    }

    async fn run_cycle_and_publish(&self, cycle: u64) -> Result<Arc<Snapshot>> {
        let state = &self.state;
        let aggregate = run_cycle(&self.source, self.settings.page_ceiling, |page, cursor| {
            state.send_replace(CycleState::FetchingPage { page, cursor });
        })
        .await?;

        let snapshot = Arc::new(Snapshot::materialize(
            cycle,
            Utc::now(),
            aggregate,
            &self.settings.bug_link_base,
        )?);
        info!(
            records = snapshot.aggregate.record_count(),
            milestones = snapshot.aggregate.milestone.len(),
            "publishing report"
        );
        self.store.publish(Arc::clone(&snapshot));
        self.export(&snapshot);
        Ok(snapshot)
    }

    fn export(&self, snapshot: &Snapshot) {
        let Some(path) = &self.settings.export_path else {
            return;
        };
        if let Err(err) = write_records_csv(path, &snapshot.aggregate.records) {
            warn!(class = %err.class(), error = %err, "export failed");
        }
    }

    /// Run a cycle now and then every interval until `shutdown` resolves.
    ///
    /// A cycle still running when `shutdown` resolves is abandoned without
    /// publishing.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested during a cycle, abandoning it");
                    self.state.send_replace(CycleState::Idle);
                    break;
                }
                _ = self.run_once() => {}
            }
        }
        info!("scheduler stopped");
    }
}
