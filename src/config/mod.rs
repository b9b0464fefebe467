//! # Configuration Management
//!
//! [`HcpConfig`] is built once at startup from the environment and passed by
//! reference to the provider client. Nothing reads the environment after that.

use std::time::Duration;
use url::Url;

use crate::errors::{Error, Result};
use crate::secrets::{Credentials, SecretScope};

pub const HCP_CLIENT_ID: &str = "HCP_CLIENT_ID";
pub const HCP_CLIENT_SECRET: &str = "HCP_CLIENT_SECRET";
pub const HCP_ORGANIZATION_ID: &str = "HCP_ORGANIZATION_ID";
pub const HCP_PROJECT_ID: &str = "HCP_PROJECT_ID";
pub const HCP_APP_NAME: &str = "HCP_APP_NAME";
pub const HCP_AUTH_URL: &str = "HCP_AUTH_URL";
pub const HCP_API_URL: &str = "HCP_API_URL";

/// Required variables, in the order they are reported when missing
pub const REQUIRED_VARS: [&str; 5] =
    [HCP_CLIENT_ID, HCP_CLIENT_SECRET, HCP_ORGANIZATION_ID, HCP_PROJECT_ID, HCP_APP_NAME];

pub const DEFAULT_AUTH_URL: &str = "https://auth.idp.hashicorp.com/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://api.cloud.hashicorp.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to talk to HCP Vault Secrets
#[derive(Debug, Clone)]
pub struct HcpConfig {
    pub credentials: Credentials,
    pub scope: SecretScope,
    pub auth_url: Url,
    pub api_url: Url,
    pub timeout: Duration,
}

impl HcpConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// Empty values count as missing. All missing required variables are
    /// reported together in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> =
            REQUIRED_VARS.iter().copied().filter(|&name| value(name).is_none()).collect();
        if !missing.is_empty() {
            return Err(Error::configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let required = |name: &str| {
            value(name).ok_or_else(|| Error::configuration(format!("{} is not set", name)))
        };

        let credentials = Credentials::new(required(HCP_CLIENT_ID)?, required(HCP_CLIENT_SECRET)?);
        let scope = SecretScope::new(
            required(HCP_ORGANIZATION_ID)?,
            required(HCP_PROJECT_ID)?,
            required(HCP_APP_NAME)?,
        );

        let auth_url = parse_url(HCP_AUTH_URL, value(HCP_AUTH_URL).as_deref().unwrap_or(DEFAULT_AUTH_URL))?;
        let api_url = parse_url(HCP_API_URL, value(HCP_API_URL).as_deref().unwrap_or(DEFAULT_API_URL))?;

        Ok(Self { credentials, scope, auth_url, api_url, timeout: DEFAULT_TIMEOUT })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::configuration(format!("{} is not a valid URL ({}): {}", name, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::configuration(format!("{} must use http or https, got '{}'", name, other))),
    }
}
