//! Testing infrastructure for bugdash.
//!
//! Cycles are driven through the [`PageSource`](crate::fetch::PageSource)
//! seam, so most tests never touch the network:
//!
//! - **[`ScriptedSource`]**: replays a fixed list of responses in order and
//!   records the cursor of every request
//! - **[`DatasetSource`]**: behaves like the real upstream over an in-memory
//!   set of records, honouring the cursor and a per-page ceiling
//! - **Helpers**: [`record`] and [`csv_page`] for building fixtures
//!
//! # Quick Start
//!
//! ```rust
//! use bugdash::testkit::{csv_page, record, ScriptedResponse, ScriptedSource};
//!
//! let source = ScriptedSource::new(vec![
//!     ScriptedResponse::Csv(csv_page(&[record(1, "M1", "Core", "NEW")])),
//!     ScriptedResponse::Status(503),
//! ]);
//! assert!(source.requests().is_empty());
//! ```

pub mod helpers;
pub mod sources;

pub use helpers::{csv_page, record};
pub use sources::{DatasetSource, ScriptedResponse, ScriptedSource};
