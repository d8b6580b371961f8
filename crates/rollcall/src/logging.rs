//! Logging setup.
//!
//! Diagnostics flow through `tracing` and land on stderr: stdout belongs
//! to the commands themselves (watch-session lines, roster listings, JSON
//! output), so a piped invocation never sees log noise mixed into its
//! data. The CLI flags choose a default threshold; a set `RUST_LOG`
//! replaces it wholesale.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output threshold selected by the CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above.
    Verbose,
    /// Everything, including per-line wedge input traces.
    Trace,
}

impl Verbosity {
    /// Derive the threshold from `--quiet` and the repeated `-v` count.
    ///
    /// `--quiet` wins over any number of `-v` occurrences.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Self::Quiet
        } else {
            match verbose {
                0 => Self::Normal,
                1 => Self::Verbose,
                _ => Self::Trace,
            }
        }
    }

    /// The tracing level this threshold admits.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Called once at startup. `RUST_LOG` takes precedence over the
/// flag-derived filter, so `RUST_LOG=rollcall=trace` traces even under
/// `--quiet`. A second call is a no-op; the first subscriber stays
/// installed.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("rollcall={}", verbosity.to_level_filter());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true));

    let _ = subscriber.try_init();
}

/// Quiet logging for tests; warnings and errors only.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
