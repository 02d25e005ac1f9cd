//! In-memory page sources.

use super::helpers::csv_page;
use crate::errors::{Error, Result};
use crate::fetch::PageSource;
use crate::model::Record;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One canned upstream answer.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// A successful response with this body.
    Csv(String),
    /// A non-success HTTP status.
    Status(u16),
}

/// Replays responses in order. Once the script is exhausted every request
/// gets an empty page.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Cursors of all requests so far, in order.
    pub fn requests(&self) -> Vec<u64> {
        self.requests.lock().clone()
    }

    /// Queue more responses, e.g. for the next cycle.
    pub fn push(&self, response: ScriptedResponse) {
        self.responses.lock().push_back(response);
    }

    fn respond(&self, after_id: u64) -> Result<Vec<u8>> {
        self.requests.lock().push(after_id);
        match self.responses.lock().pop_front() {
            Some(ScriptedResponse::Csv(body)) => Ok(body.into_bytes()),
            Some(ScriptedResponse::Status(status)) => Err(Error::UpstreamStatus {
                status,
                url: format!("scripted://page?after={after_id}"),
            }),
            None => Ok(Vec::new()),
        }
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(&self, after_id: u64) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let response = self.respond(after_id);
        async move { response }
    }
}

/// Serves an in-memory record set the way the upstream does: rows with an id
/// above the cursor, ascending, at most `ceiling` per page.
#[derive(Debug)]
pub struct DatasetSource {
    records: Mutex<Vec<Record>>,
    ceiling: usize,
    delay: Option<Duration>,
    fetches: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl DatasetSource {
    pub fn new(records: Vec<Record>, ceiling: usize) -> Self {
        Self {
            records: Mutex::new(records),
            ceiling,
            delay: None,
            fetches: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn replace_records(&self, records: Vec<Record>) {
        *self.records.lock() = records;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn page_after(&self, after_id: u64) -> String {
        let records = self.records.lock();
        let mut page: Vec<Record> = records.iter().filter(|r| r.id > after_id).cloned().collect();
        page.sort_by_key(|r| r.id);
        page.truncate(self.ceiling);
        csv_page(&page)
    }
}

impl PageSource for DatasetSource {
    fn fetch_page(&self, after_id: u64) -> impl Future<Output = Result<Vec<u8>>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let body = self.page_after(after_id);
        let delay = self.delay;
        let in_flight = Arc::clone(&self.in_flight);
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(body.into_bytes())
        }
    }
}
