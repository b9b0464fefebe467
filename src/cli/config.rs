//! Configuration file handling for the hcvss CLI
//!
//! Loads CLI configuration from ~/.hcvss/config.toml and resolves command
//! settings from multiple sources.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

use crate::config::DEFAULT_TIMEOUT;
use crate::integrity::DEFAULT_MIN_LENGTH;

/// Snapshot file used when nothing else names one
pub const DEFAULT_SNAPSHOT_FILE: &str = "hcvss-snapshot.json";

/// Output format used when nothing else names one
pub const DEFAULT_OUTPUT: &str = "table";

pub const HCVSS_SNAPSHOT_FILE: &str = "HCVSS_SNAPSHOT_FILE";
pub const HCVSS_TIMEOUT: &str = "HCVSS_TIMEOUT";

/// CLI configuration stored in ~/.hcvss/config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct CliConfig {
    /// Snapshot file read by `check` and written by `fetch`
    pub snapshot_file: Option<PathBuf>,

    /// Minimum secret length enforced by `check`
    #[validate(range(min = 1, max = 4096, message = "min_length must be between 1 and 4096"))]
    pub min_length: Option<usize>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "timeout must be between 1 and 300 seconds"))]
    pub timeout: Option<u64>,

    /// Default output format
    pub output: Option<String>,
}

impl CliConfig {
    /// Get the default configuration file path (~/.hcvss/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Unable to determine home directory")?;

        let mut path = PathBuf::from(home);
        path.push(".hcvss");
        path.push("config.toml");

        Ok(path)
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from a specific path. A missing file yields the
    /// default configuration.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No CLI config file");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .map_err(crate::Error::from)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded CLI config file");
        Ok(config)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the snapshot file from multiple sources
///
/// Checks sources in the following priority order:
/// 1. --file command line flag
/// 2. ~/.hcvss/config.toml
/// 3. HCVSS_SNAPSHOT_FILE environment variable
/// 4. Default: hcvss-snapshot.json
pub fn resolve_snapshot_file(file_flag: Option<PathBuf>, config: &CliConfig) -> PathBuf {
    pick_snapshot_file(file_flag, config, env_value(HCVSS_SNAPSHOT_FILE))
}

fn pick_snapshot_file(file_flag: Option<PathBuf>, config: &CliConfig, env: Option<String>) -> PathBuf {
    if let Some(path) = file_flag {
        debug!("Using snapshot file from --file flag: {}", path.display());
        return path;
    }

    if let Some(path) = config.snapshot_file.clone() {
        debug!("Using snapshot file from config file: {}", path.display());
        return path;
    }

    if let Some(path) = env {
        debug!("Using snapshot file from {} environment variable: {}", HCVSS_SNAPSHOT_FILE, path);
        return PathBuf::from(path);
    }

    debug!("Using default snapshot file: {}", DEFAULT_SNAPSHOT_FILE);
    PathBuf::from(DEFAULT_SNAPSHOT_FILE)
}

/// Resolve the minimum secret length
///
/// Checks sources in the following priority order:
/// 1. --min-length command line flag
/// 2. ~/.hcvss/config.toml
/// 3. Default: 20
pub fn resolve_min_length(min_length_flag: Option<usize>, config: &CliConfig) -> usize {
    if let Some(min_length) = min_length_flag {
        debug!("Using minimum length from --min-length flag: {}", min_length);
        return min_length;
    }

    if let Some(min_length) = config.min_length {
        debug!("Using minimum length from config file: {}", min_length);
        return min_length;
    }

    DEFAULT_MIN_LENGTH
}

/// Resolve the timeout from multiple sources
///
/// Checks sources in the following priority order:
/// 1. --timeout command line flag
/// 2. ~/.hcvss/config.toml
/// 3. HCVSS_TIMEOUT environment variable
/// 4. Default: 30 seconds
pub fn resolve_timeout(timeout_flag: Option<u64>, config: &CliConfig) -> u64 {
    pick_timeout(timeout_flag, config, env_value(HCVSS_TIMEOUT))
}

fn pick_timeout(timeout_flag: Option<u64>, config: &CliConfig, env: Option<String>) -> u64 {
    if let Some(timeout) = timeout_flag {
        debug!("Using timeout from --timeout flag: {} seconds", timeout);
        return timeout;
    }

    if let Some(timeout) = config.timeout {
        debug!("Using timeout from config file: {} seconds", timeout);
        return timeout;
    }

    if let Some(raw) = env {
        match raw.trim().parse::<u64>() {
            Ok(timeout) if timeout > 0 => {
                debug!("Using timeout from {} environment variable: {} seconds", HCVSS_TIMEOUT, timeout);
                return timeout;
            }
            _ => debug!("Ignoring invalid {} value: {}", HCVSS_TIMEOUT, raw),
        }
    }

    let default_timeout = DEFAULT_TIMEOUT.as_secs();
    debug!("Using default timeout: {} seconds", default_timeout);
    default_timeout
}

/// Resolve the output format name
///
/// Checks sources in the following priority order:
/// 1. --output command line flag
/// 2. ~/.hcvss/config.toml
/// 3. Default: table
pub fn resolve_output(output_flag: Option<String>, config: &CliConfig) -> String {
    output_flag
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
}
