//! Shared output formatting utilities for CLI commands
//!
//! Provides consistent output formatting across commands with support for
//! JSON, YAML, and table formats. Reports never contain secret values.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

use super::check::CheckReport;
use super::fetch::FetchSummary;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Render data as JSON
pub fn render_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
}

/// Render data as YAML
pub fn render_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn table_header(out: &mut String, columns: &[(&str, usize)]) {
    let mut header = String::new();
    for (name, width) in columns {
        header.push_str(&format!("{:<width$} ", name, width = width));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let total_width: usize = columns.iter().map(|(_, w)| w + 1).sum();
    out.push_str(&"-".repeat(total_width.saturating_sub(1)));
    out.push('\n');
}

/// Table rendering of a fetch summary
pub fn render_fetch_table(summary: &FetchSummary) -> String {
    let mut out = String::new();
    table_header(&mut out, &[("Name", 40), ("Version", 10), ("Created", 25)]);

    for secret in &summary.secrets {
        let version = secret.version.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        let created = secret
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<40} {:<10} {}\n", truncate(&secret.name, 40), version, created));
    }

    out.push('\n');
    out.push_str(&format!(
        "Saved {} secrets to {} (fingerprint {})\n",
        summary.count,
        summary.snapshot_file,
        truncate(&summary.fingerprint, 16)
    ));
    out
}

/// Table rendering of a check report
pub fn render_check_table(report: &CheckReport) -> String {
    let mut out = String::new();

    match &report.previous_captured_at {
        Some(at) => out.push_str(&format!(
            "Compared {} (captured {}) with {}\n",
            report.previous_file,
            at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.current_source
        )),
        None => out.push_str(&format!(
            "No snapshot at {}; every current secret is reported as added. Run `hcvss fetch` to record one.\n",
            report.previous_file
        )),
    }

    let diff = &report.diff;
    if diff.has_drift() {
        out.push('\n');
        table_header(&mut out, &[("Status", 10), ("Secret", 50)]);
        let rows = diff
            .added
            .iter()
            .map(|n| ("added", n))
            .chain(diff.removed.iter().map(|n| ("removed", n)))
            .chain(diff.changed.iter().map(|n| ("changed", n)));
        for (status, name) in rows {
            out.push_str(&format!("{:<10} {}\n", status, name));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "{} added, {} removed, {} changed, {} unchanged\n",
        diff.added.len(),
        diff.removed.len(),
        diff.changed.len(),
        diff.unchanged
    ));

    for violation in &report.violations {
        out.push_str(&format!("{}\n", violation));
    }

    out.push_str(if report.passed() { "Result: OK\n" } else { "Result: FAILED\n" });
    out
}

fn emit(rendered: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes()).context("Failed to write output")?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n").context("Failed to write output")?;
    }
    Ok(())
}

/// Print a fetch summary in the requested format
pub fn print_fetch_summary(summary: &FetchSummary, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => render_json(summary)?,
        OutputFormat::Yaml => render_yaml(summary)?,
        OutputFormat::Table => render_fetch_table(summary),
    };
    emit(&rendered)
}

/// Print a check report in the requested format
pub fn print_check_report(report: &CheckReport, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => render_json(report)?,
        OutputFormat::Yaml => render_yaml(report)?,
        OutputFormat::Table => render_check_table(report),
    };
    emit(&rendered)
}
