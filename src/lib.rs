// Export modules for library usage
pub mod aggregate;
pub mod cli;
pub mod commands;
pub mod config;
pub mod decode;
pub mod errors;
pub mod export;
pub mod fetch;
pub mod model;
pub mod observability;
pub mod publish;
pub mod report;
pub mod scheduler;
pub mod server;
pub mod testkit;

// Re-export commonly used types
pub use crate::aggregate::{Aggregate, Aggregator, Dimension, FrequencyTable, PageBoundary};
pub use crate::config::{load_config, BugdashConfig};
pub use crate::decode::{decode_page, PageDecoder, PageSummary};
pub use crate::errors::{DecodeError, Error, ErrorClass, Result};
pub use crate::fetch::{HttpPageSource, PageSource};
pub use crate::model::Record;
pub use crate::publish::{ReportStore, Snapshot};
pub use crate::scheduler::{run_cycle, CycleState, Scheduler, SchedulerSettings};
