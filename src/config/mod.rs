//! Configuration for bugdash.
//!
//! Values are layered: built-in defaults, then a `.bugdash.toml` file
//! (explicit `--config`, or the nearest one found walking up from the
//! working directory), then environment variables and CLI flags applied by
//! [`crate::cli`].
//!
//! ```toml
//! [upstream]
//! page_ceiling = 10000
//! request_timeout_secs = 60
//!
//! [schedule]
//! interval_secs = 3600
//!
//! [server]
//! port = 3000
//! static_dir = "public"
//!
//! [export]
//! path = "out/report.csv"
//! ```

mod core;
mod loader;

pub use self::core::{
    BugdashConfig, ExportConfig, ScheduleConfig, ServerConfig, UpstreamConfig, DEFAULT_BASE_URL,
};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
