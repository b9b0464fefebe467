//! `hcvss fetch`: pull the current secrets and save them as the new snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use super::config::{self, CliConfig};
use super::output::{self, OutputFormat};
use crate::config::HcpConfig;
use crate::integrity::SecretSnapshot;
use crate::secrets::{HcpSecretsClient, SecretScope, SecretsProvider};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Snapshot file to write
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format (json, yaml, or table)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// What a fetch saved. Names and versions only.
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub snapshot_file: String,
    pub captured_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<SecretScope>,
    pub fingerprint: String,
    pub count: usize,
    pub secrets: Vec<SecretSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecretSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FetchSummary {
    pub fn new(snapshot: &SecretSnapshot, path: &Path) -> Self {
        Self {
            snapshot_file: path.display().to_string(),
            captured_at: snapshot.captured_at(),
            scope: snapshot.scope().cloned(),
            fingerprint: snapshot.fingerprint(),
            count: snapshot.len(),
            secrets: snapshot
                .iter()
                .map(|(name, entry)| SecretSummary {
                    name: name.to_string(),
                    version: entry.metadata.version,
                    created_at: entry.metadata.created_at,
                })
                .collect(),
        }
    }
}

/// Fetch the configured scope through `provider` and persist it at `path`
pub async fn fetch_and_save<P>(provider: &P, hcp: &HcpConfig, path: &Path) -> crate::Result<FetchSummary>
where
    P: SecretsProvider + ?Sized,
{
    let snapshot = provider.fetch_snapshot(&hcp.credentials, &hcp.scope).await?;
    snapshot.save(path)?;

    info!(secrets = snapshot.len(), path = %path.display(), "Snapshot updated");
    Ok(FetchSummary::new(&snapshot, path))
}

/// Handle `hcvss fetch`
pub async fn handle_fetch_command(
    args: FetchArgs,
    file_config: &CliConfig,
    timeout_flag: Option<u64>,
) -> Result<ExitCode> {
    let path = config::resolve_snapshot_file(args.file, file_config);
    let format: OutputFormat = config::resolve_output(args.output, file_config).parse()?;
    let timeout = config::resolve_timeout(timeout_flag, file_config);

    let hcp = HcpConfig::from_env()?.with_timeout(Duration::from_secs(timeout));
    let client = HcpSecretsClient::new(&hcp)?;

    let summary = fetch_and_save(&client, &hcp, &path)
        .await
        .with_context(|| format!("Failed to fetch secrets for {}", hcp.scope))?;

    output::print_fetch_summary(&summary, format)?;
    Ok(ExitCode::SUCCESS)
}
