//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. Logs go to stderr so that
//! command output on stdout stays machine-readable.
//!
//! The filter comes from `RUST_LOG` when set, otherwise `info` (or `debug`
//! with `--verbose`). Noisy HTTP internals are capped at `warn`.

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{fmt as subscriber_fmt, EnvFilter};

use crate::errors::{Error, Result};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::configuration(format!(
                "Unsupported log format: '{}'. Use 'text' or 'json'.",
                s
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging options resolved from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Directive string used when `RUST_LOG` is unset
    pub fn default_directives(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        format!("{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn", level)
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }
}

/// Install the global subscriber.
///
/// A subscriber that is already installed (e.g. by a test harness) is left in
/// place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let builder = subscriber_fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    // Subscriber already set elsewhere (e.g. integration tests); ignore.
    let _ = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    Ok(())
}
