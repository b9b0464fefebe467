//! `hcvss check`: compare the saved snapshot with the current secrets.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};

use super::config::{self, CliConfig};
use super::output::{self, OutputFormat};
use super::EXIT_CHECK_FAILED;
use crate::config::HcpConfig;
use crate::integrity::{compare, DiffResult, LengthPolicy, PolicyViolation, SecretSnapshot};
use crate::secrets::{HcpSecretsClient, SecretsProvider};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Previously saved snapshot to check against
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Compare against this snapshot file instead of fetching from HCP
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Values at or below this many characters are reported as too short
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Output format (json, yaml, or table)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Outcome of a check. Carries names and lengths, never values.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub previous_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_captured_at: Option<DateTime<Utc>>,
    pub current_source: String,
    pub current_captured_at: DateTime<Utc>,
    pub diff: DiffResult,
    pub min_length: usize,
    pub violations: Vec<PolicyViolation>,
    pub passed: bool,
}

impl CheckReport {
    /// Build a report. `previous` is `None` when no snapshot was saved yet,
    /// in which case the current state is compared against an empty one.
    pub fn new(
        previous_file: &Path,
        previous: Option<&SecretSnapshot>,
        current: &SecretSnapshot,
        current_source: String,
        policy: &LengthPolicy,
    ) -> Self {
        let empty = SecretSnapshot::empty();
        let diff = compare(previous.unwrap_or(&empty), current);
        let violations = policy.evaluate(current);
        let passed = !diff.has_drift() && violations.is_empty();

        Self {
            previous_file: previous_file.display().to_string(),
            previous_captured_at: previous.map(SecretSnapshot::captured_at),
            current_source,
            current_captured_at: current.captured_at(),
            diff,
            min_length: policy.min_length,
            violations,
            passed,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// `0` when clean, [`EXIT_CHECK_FAILED`] on drift or policy violations
    pub fn exit_code(&self) -> ExitCode {
        if self.passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(EXIT_CHECK_FAILED)
        }
    }
}

/// Load the saved snapshot, or `None` when the file does not exist yet
pub fn load_previous(path: &Path) -> crate::Result<Option<SecretSnapshot>> {
    if !path.exists() {
        warn!(path = %path.display(), "No saved snapshot; comparing against empty state");
        return Ok(None);
    }
    SecretSnapshot::load(path).map(Some)
}

/// Check the saved snapshot at `previous_file` against the live secrets
pub async fn check_against_provider<P>(
    provider: &P,
    hcp: &HcpConfig,
    previous_file: &Path,
    policy: &LengthPolicy,
) -> crate::Result<CheckReport>
where
    P: SecretsProvider + ?Sized,
{
    let previous = load_previous(previous_file)?;
    let current = provider.fetch_snapshot(&hcp.credentials, &hcp.scope).await?;
    let report =
        CheckReport::new(previous_file, previous.as_ref(), &current, format!("hcp:{}", hcp.scope), policy);
    log_outcome(&report);
    Ok(report)
}

/// Check two saved snapshot files against each other without network access
pub fn check_against_file(
    previous_file: &Path,
    current_file: &Path,
    policy: &LengthPolicy,
) -> crate::Result<CheckReport> {
    let previous = load_previous(previous_file)?;
    let current = SecretSnapshot::load(current_file)?;
    let report = CheckReport::new(
        previous_file,
        previous.as_ref(),
        &current,
        format!("file:{}", current_file.display()),
        policy,
    );
    log_outcome(&report);
    Ok(report)
}

fn log_outcome(report: &CheckReport) {
    info!(
        added = report.diff.added.len(),
        removed = report.diff.removed.len(),
        changed = report.diff.changed.len(),
        unchanged = report.diff.unchanged,
        violations = report.violations.len(),
        passed = report.passed,
        "Integrity check finished"
    );
}

/// Handle `hcvss check`
pub async fn handle_check_command(
    args: CheckArgs,
    file_config: &CliConfig,
    timeout_flag: Option<u64>,
) -> Result<ExitCode> {
    let previous_file = config::resolve_snapshot_file(args.file, file_config);
    let policy = LengthPolicy::new(config::resolve_min_length(args.min_length, file_config));
    let format: OutputFormat = config::resolve_output(args.output, file_config).parse()?;

    let report = match args.current {
        Some(current_file) => check_against_file(&previous_file, &current_file, &policy)
            .with_context(|| {
                format!(
                    "Failed to check {} against {}",
                    previous_file.display(),
                    current_file.display()
                )
            })?,
        None => {
            let timeout = config::resolve_timeout(timeout_flag, file_config);
            let hcp = HcpConfig::from_env()?.with_timeout(Duration::from_secs(timeout));
            let client = HcpSecretsClient::new(&hcp)?;
            check_against_provider(&client, &hcp, &previous_file, &policy)
                .await
                .with_context(|| format!("Failed to check secrets for {}", hcp.scope))?
        }
    };

    output::print_check_report(&report, format)?;
    Ok(report.exit_code())
}
