//! CLI command implementations.
//!
//! Available commands:
//! - **serve**: refresh on a schedule and serve the report over HTTP
//! - **report**: run one refresh and print the summary tables
//! - **init**: write a default configuration file

pub mod init;
pub mod report;
pub mod serve;

pub use init::init_config;
pub use report::{render_report_text, run_report};
pub use serve::{run_serve, shutdown_signal};
