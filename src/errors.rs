//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bugdash operations
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream request could not complete (connect, read, timeout)
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// The configured upstream URL cannot be parsed
    #[error("Invalid upstream URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The page header lacks columns every row needs
    #[error("Page header is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A full page came back without moving the cursor forward
    #[error("Cursor stalled at bug {cursor}: full page returned no higher id")]
    StalledCursor { cursor: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV reader/writer errors outside row decoding
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Config file syntax errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Failure classes used for logging and for deciding what a failure affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The cycle is aborted; the last published report stays servable.
    Network,
    /// A page could not be interpreted at all.
    Decode,
    /// Export or config file I/O; logged and abandoned.
    Filesystem,
    Configuration,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Filesystem => "filesystem",
            Self::Configuration => "config",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Wrap a reqwest failure for `url`, splitting out status errors
    pub fn from_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        match source.status() {
            Some(status) => Self::UpstreamStatus {
                status: status.as_u16(),
                url,
            },
            None => Self::Transport { url, source },
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transport { .. } | Self::UpstreamStatus { .. } => ErrorClass::Network,
            Self::MissingColumns { .. } | Self::StalledCursor { .. } | Self::Csv(_) => {
                ErrorClass::Decode
            }
            Self::FileSystem { .. } | Self::Io(_) => ErrorClass::Filesystem,
            Self::InvalidUrl { .. } | Self::Configuration(_) | Self::Json(_) | Self::Toml(_) => {
                ErrorClass::Configuration
            }
        }
    }

    /// Whether the request timed out rather than failing outright
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// A single CSV row that could not become a record.
///
/// Row failures are reported and skipped; they never abort the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub line: Option<u64>,
    pub message: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "row at line {}: {}", line, self.message),
            None => write!(f, "row at line ?: {}", self.message),
        }
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    pub fn from_csv(err: &csv::Error) -> Self {
        Self {
            line: err.position().map(csv::Position::line),
            message: err.to_string(),
        }
    }
}
