//! Secrets provider trait and the types passed across it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::SecretString;
use crate::errors::Result;
use crate::integrity::SecretSnapshot;

/// Client credentials used to obtain an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Service principal client id
    pub client_id: String,

    /// Service principal client secret
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecretString>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

/// Bearer token returned by [`SecretsProvider::authenticate`].
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: SecretString,

    /// Lifetime reported by the identity provider, in seconds
    pub expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(token: impl Into<SecretString>, expires_in: Option<u64>) -> Self {
        Self { token: token.into(), expires_in }
    }

    /// Raw bearer value, for the `Authorization` header only.
    pub fn bearer(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Address of one HCP Vault Secrets application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretScope {
    pub organization_id: String,
    pub project_id: String,
    pub app_name: String,
}

impl SecretScope {
    pub fn new(
        organization_id: impl Into<String>,
        project_id: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            project_id: project_id.into(),
            app_name: app_name.into(),
        }
    }
}

impl fmt::Display for SecretScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization_id, self.project_id, self.app_name)
    }
}

/// External service that authenticates callers and supplies secret values.
///
/// Implementations MUST NOT log secret values or credentials. Failures are
/// returned as [`crate::Error::Authentication`], [`crate::Error::Fetch`] or
/// [`crate::Error::InvalidSnapshot`] and are never retried here.
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Exchange client credentials for an access token.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken>;

    /// Fetch every secret in `scope` as a validated snapshot.
    async fn fetch(&self, token: &AccessToken, scope: &SecretScope) -> Result<SecretSnapshot>;

    /// Authenticate and fetch in one call.
    async fn fetch_snapshot(
        &self,
        credentials: &Credentials,
        scope: &SecretScope,
    ) -> Result<SecretSnapshot> {
        let token = self.authenticate(credentials).await?;
        self.fetch(&token, scope).await
    }
}
