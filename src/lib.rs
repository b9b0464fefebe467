//! # hcvss
//!
//! Scanner for HCP Vault Secrets. It records the secrets of one application
//! as a local snapshot and later reports drift between that snapshot and the
//! live secrets, together with values that fail the minimum length policy.
//!
//! ## Architecture
//!
//! ```text
//! CLI (fetch / check) → SecretsProvider (HCP) → SecretSnapshot
//!          ↓                                        ↓
//!   Snapshot file (JSON)  ←──────────  compare + LengthPolicy
//! ```
//!
//! ## Core Components
//!
//! - **Secrets**: `SecretString`, the `SecretsProvider` trait and the HCP client
//! - **Integrity**: snapshots, `compare` and the length policy; no I/O besides
//!   snapshot persistence
//! - **Configuration**: `HcpConfig` built once from the environment
//! - **CLI**: clap front end with JSON, YAML and table output
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use hcvss::config::HcpConfig;
//! use hcvss::integrity::{compare, LengthPolicy, SecretSnapshot};
//! use hcvss::secrets::HcpSecretsClient;
//!
//! #[tokio::main]
//! async fn main() -> hcvss::Result<()> {
//!     let config = HcpConfig::from_env()?;
//!     let client = HcpSecretsClient::new(&config)?;
//!
//!     let previous = SecretSnapshot::load("hcvss-snapshot.json".as_ref())?;
//!     let current = client.fetch_configured(&config).await?;
//!
//!     let diff = compare(&previous, &current);
//!     let violations = LengthPolicy::default().evaluate(&current);
//!     println!("drift: {}, violations: {}", diff.has_drift(), violations.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod integrity;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
