//! Logging setup.
//!
//! Everything logs through `tracing`. The subscriber prints to stderr so
//! the `report` command's tables on stdout stay clean. `RUST_LOG` takes
//! precedence over the `-v`/`--quiet` flags when it is set.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level implied by the command line flags.
pub fn level_for(verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter_for(verbosity: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity, quiet).as_str().to_lowercase()))
}

/// Install the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_tracing(verbosity: u8, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbosity, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0, false), Level::WARN);
        assert_eq!(level_for(1, false), Level::INFO);
        assert_eq!(level_for(2, false), Level::DEBUG);
        assert_eq!(level_for(3, false), Level::TRACE);
        assert_eq!(level_for(7, false), Level::TRACE);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        assert_eq!(level_for(3, true), Level::ERROR);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(0, true);
        init_tracing(2, false);
    }
}
