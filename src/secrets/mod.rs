//! Secrets provider abstraction.
//!
//! The [`SecretsProvider`] trait is the seam between the scanner and the
//! external secrets service:
//! - **authenticate**: exchange client credentials for an access token
//! - **fetch**: read every secret of one application as a [`SecretSnapshot`]
//!
//! [`HcpSecretsClient`] implements it against HCP Vault Secrets.
//!
//! # Example
//!
//! ```rust,ignore
//! use hcvss::config::HcpConfig;
//! use hcvss::secrets::{HcpSecretsClient, SecretsProvider};
//!
//! let config = HcpConfig::from_env()?;
//! let client = HcpSecretsClient::new(&config)?;
//! let snapshot = client.fetch_snapshot(&config.credentials, &config.scope).await?;
//! ```
//!
//! Secret values, client secrets and tokens are held as [`SecretString`] and
//! are never logged.
//!
//! [`SecretSnapshot`]: crate::integrity::SecretSnapshot

pub mod hcp;
pub mod provider;
pub mod types;

pub use hcp::HcpSecretsClient;
pub use provider::{AccessToken, Credentials, SecretScope, SecretsProvider};
pub use types::SecretString;
