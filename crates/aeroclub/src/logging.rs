//! Terminal logging for the `aeroclub` binary.
//!
//! Library code only emits `tracing` events; the subscriber is installed here
//! from the `-v`/`-q` flags or `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Warnings and errors only; the CLI prints its own results.
    #[default]
    Normal,
    /// Writes and decisions (info and above).
    Verbose,
    /// Pipeline steps (debug and above).
    Debug,
    /// Every occurrence scanned (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Verbosity for a `-v` repeat count.
    #[must_use]
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(self) -> String {
        format!("aeroclub={}", self.to_level_filter())
    }

    /// Whether log lines carry a timestamp and target.
    ///
    /// At the default levels only warnings reach the terminal next to command
    /// output, so they are kept short.
    #[must_use]
    pub fn is_diagnostic(self) -> bool {
        matches!(self, Self::Debug | Self::Trace)
    }
}

/// Install the global subscriber for the CLI.
///
/// `RUST_LOG` wins over `verbosity` when set. Everything is written to stderr
/// so stdout stays parseable (`--format json`). Calling this twice is harmless.
///
/// # Examples
///
/// ```no_run
/// use aeroclub::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = if verbosity.is_diagnostic() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_target(false).without_time())
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Capture warnings in test output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("aeroclub=warn")
        .with_test_writer()
        .try_init();
}
