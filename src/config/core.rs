use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Error, Result};

/// All bugs where the Fission milestone is set, CSV with human-readable
/// headers, ascending by id, no row limit beyond the server's own ceiling.
pub const DEFAULT_BASE_URL: &str = "https://bugzilla.mozilla.org/buglist.cgi?\
columnlist=triage_owner%2Cproduct%2Ccomponent%2Ccf_fx_iteration%2Ccf_fission_milestone\
%2Cbug_status%2Cresolution%2Cpriority%2Ckeywords%2Creporter%2Cassigned_to%2Cshort_desc\
%2Copendate%2Cchangeddate\
&f1=cf_fission_milestone&o1=notequals&v1=---\
&query_format=advanced&ctype=csv&human=1&order=bug_id&limit=0";

/// Root configuration structure for bugdash
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BugdashConfig {
    /// Upstream query and request settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Refresh schedule
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Optional CSV export of each finished cycle
    #[serde(default)]
    pub export: ExportConfig,
}

impl BugdashConfig {
    /// Reject values the scheduler or fetcher cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.page_ceiling == 0 {
            return Err(Error::Configuration(
                "upstream.page_ceiling must be greater than zero".into(),
            ));
        }
        if self.upstream.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "upstream.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.schedule.interval_secs == 0 {
            return Err(Error::Configuration(
                "schedule.interval_secs must be greater than zero".into(),
            ));
        }
        reqwest::Url::parse(&self.upstream.base_url).map_err(|e| Error::InvalidUrl {
            url: self.upstream.base_url.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Query URL without the cursor bound (default: all Fission bugs)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum rows the upstream returns per response (default: 10000)
    #[serde(default = "default_page_ceiling")]
    pub page_ceiling: usize,

    /// Per-request timeout in seconds (default: 60)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Prefix a bug id is appended to for report links
    #[serde(default = "default_bug_link_base")]
    pub bug_link_base: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_ceiling: default_page_ceiling(),
            request_timeout_secs: default_request_timeout_secs(),
            bug_link_base: default_bug_link_base(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    /// Seconds between the start of one refresh and the next (default: 3600)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Listening port (default: 3000, `PORT` overrides)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory static assets are served from (default: `public`)
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid listen address: {e}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Where to write the cycle's records as CSV; unset disables export
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_ceiling() -> usize {
    10_000
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_bug_link_base() -> String {
    "https://bugzilla.mozilla.org/show_bug.cgi?id=".to_string()
}

fn default_user_agent() -> String {
    concat!("bugdash/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}
