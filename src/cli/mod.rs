//! # Command Line Interface
//!
//! `hcvss fetch` records the current secrets as a snapshot file and
//! `hcvss check` compares that snapshot with the live secrets.

pub mod check;
pub mod config;
pub mod fetch;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::observability::{init_logging, LogFormat, LoggingConfig};
use config::CliConfig;

/// Exit status of `check` when drift or a policy violation is found
pub const EXIT_CHECK_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "hcvss")]
#[command(about = "HCP Vault Secrets scanner: snapshot secrets and detect drift")]
#[command(version = concat!("v", env!("CARGO_PKG_VERSION")))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format (text or json)
    #[arg(long, global = true, env = "HCVSS_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Path to the CLI config file (default: ~/.hcvss/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the current secrets and save them as the snapshot
    Fetch(fetch::FetchArgs),

    /// Compare the saved snapshot with the current secrets
    Check(check::CheckArgs),
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<ExitCode> {
    run(Cli::parse()).await
}

/// Run an already parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let format: LogFormat = cli.log_format.parse()?;
    init_logging(&LoggingConfig { verbose: cli.verbose, format })?;

    let file_config = match cli.config {
        Some(path) => CliConfig::load_from_path(&path)?,
        None => CliConfig::load()?,
    };
    debug!(?file_config, "Resolved CLI config file");

    match cli.command {
        Commands::Fetch(args) => fetch::handle_fetch_command(args, &file_config, cli.timeout).await,
        Commands::Check(args) => check::handle_check_command(args, &file_config, cli.timeout).await,
    }
}
