use crate::config::BugdashConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bugdash")]
#[command(about = "Periodic bug tracker CSV aggregation with an HTML and JSON dashboard", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to the nearest .bugdash.toml)
    #[arg(long, global = true, env = "BUGDASH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for `serve` when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// The command to run; `serve` when none was named.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(self.serve))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh on a schedule and serve the report over HTTP (default)
    Serve(ServeArgs),

    /// Run one refresh and print the summary tables
    Report(ReportArgs),

    /// Write a default .bugdash.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct UpstreamArgs {
    /// Upstream CSV query URL, without the cursor bound
    #[arg(long = "upstream-url", env = "BUGDASH_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Maximum rows the upstream returns per response
    #[arg(long = "page-ceiling")]
    pub page_ceiling: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long = "request-timeout")]
    pub request_timeout_secs: Option<u64>,
}

impl UpstreamArgs {
    fn apply(&self, config: &mut BugdashConfig) {
        if let Some(url) = &self.upstream_url {
            config.upstream.base_url = url.clone();
        }
        if let Some(ceiling) = self.page_ceiling {
            config.upstream.page_ceiling = ceiling;
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.upstream.request_timeout_secs = timeout;
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Seconds between refreshes
    #[arg(long = "interval-secs", env = "BUGDASH_INTERVAL_SECS")]
    pub interval_secs: Option<u64>,

    /// Directory static assets are served from
    #[arg(long = "static-dir")]
    pub static_dir: Option<PathBuf>,

    /// Write each finished refresh to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

impl ServeArgs {
    /// Layer these flags over `config`.
    pub fn apply(&self, config: &mut BugdashConfig) {
        self.upstream.apply(config);
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(interval) = self.interval_secs {
            config.schedule.interval_secs = interval;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = dir.clone();
        }
        if let Some(path) = &self.export {
            config.export.path = Some(path.clone());
        }
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ReportArgs {
    /// Also print one table of bugs per milestone
    #[arg(long)]
    pub breakdown: bool,

    /// Write the records to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

impl ReportArgs {
    /// Layer these flags over `config`.
    pub fn apply(&self, config: &mut BugdashConfig) {
        self.upstream.apply(config);
        if let Some(path) = &self.export {
            config.export.path = Some(path.clone());
        }
    }
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}
