//! Upstream page fetching.
//!
//! The scheduler only needs one capability from the upstream: "give me the
//! CSV page of bugs with ids above this cursor". [`PageSource`] is that seam;
//! [`HttpPageSource`] is the production implementation and
//! [`crate::testkit::ScriptedSource`] the in-memory one used by tests.

mod http;

pub use http::{HttpPageSource, CURSOR_FIELD_PARAM, CURSOR_OP_PARAM, CURSOR_VALUE_PARAM};

use crate::errors::Result;
use std::future::Future;

/// A source of CSV pages ordered ascending by bug id.
///
/// Implementations must be `Send + Sync` so the scheduler task can own them.
/// Failures are reported, never retried here: the next scheduled cycle is
/// the retry.
pub trait PageSource: Send + Sync {
    /// Fetch the page of rows whose id is strictly greater than `after_id`.
    fn fetch_page(&self, after_id: u64) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

impl<S: PageSource> PageSource for std::sync::Arc<S> {
    fn fetch_page(&self, after_id: u64) -> impl Future<Output = Result<Vec<u8>>> + Send {
        (**self).fetch_page(after_id)
    }
}
