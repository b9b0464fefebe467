//! HCP Vault Secrets provider.
//!
//! Authenticates with the HashiCorp identity provider using the OAuth2
//! client-credentials grant and reads every secret of an application through
//! the `secrets:open` endpoint, following pagination until exhausted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, field, info, instrument};
use url::Url;

use super::provider::{AccessToken, Credentials, SecretScope, SecretsProvider};
use crate::config::HcpConfig;
use crate::errors::{Error, Result};
use crate::integrity::{SecretEntry, SecretMetadata, SecretSnapshot};

/// Audience requested for HCP API tokens
pub const HCP_AUDIENCE: &str = "https://api.hashicorp.cloud";

/// Vault Secrets API version segment
pub const SECRETS_API_VERSION: &str = "2023-11-28";

/// Query parameter carrying the page cursor
const PAGE_TOKEN_PARAM: &str = "pagination.next_page_token";

/// Longest provider error body echoed back in an error message
const MAX_ERROR_BODY: usize = 256;

/// HTTP client for HCP Vault Secrets
#[derive(Debug, Clone)]
pub struct HcpSecretsClient {
    client: Client,
    auth_url: Url,
    api_url: Url,
}

impl HcpSecretsClient {
    /// Create a client for the endpoints and timeout in `config`
    pub fn new(config: &HcpConfig) -> Result<Self> {
        Self::with_endpoints(config.auth_url.clone(), config.api_url.clone(), config.timeout)
    }

    /// Create a client against explicit endpoints
    pub fn with_endpoints(auth_url: Url, api_url: Url, timeout: Duration) -> Result<Self> {
        if api_url.cannot_be_a_base() {
            return Err(Error::configuration(format!("HCP API URL cannot be a base: {}", api_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, auth_url, api_url })
    }

    /// Authenticate and fetch the scope configured in `config`
    pub async fn fetch_configured(&self, config: &HcpConfig) -> Result<SecretSnapshot> {
        self.fetch_snapshot(&config.credentials, &config.scope).await
    }

    /// URL of the `secrets:open` endpoint for `scope`
    pub fn open_secrets_url(&self, scope: &SecretScope) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration("HCP API URL cannot be a base"))?
            .pop_if_empty()
            .extend([
                "secrets",
                SECRETS_API_VERSION,
                "organizations",
                &scope.organization_id,
                "projects",
                &scope.project_id,
                "apps",
                &scope.app_name,
                "secrets:open",
            ]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        token: &AccessToken,
        url: &Url,
        page_token: Option<&str>,
    ) -> Result<OpenSecretsResponse> {
        let mut request = self.client.get(url.clone()).bearer_auth(token.bearer());
        if let Some(page_token) = page_token {
            request = request.query(&[(PAGE_TOKEN_PARAM, page_token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::fetch(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        debug!(status = %status, "Received secrets page");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = error_body(response).await;
                Err(Error::authentication(format!("HCP rejected the access token ({}): {}", status, body)))
            }
            s if !s.is_success() => {
                let body = error_body(response).await;
                Err(Error::fetch_with_status(
                    format!("HCP returned {} for {}: {}", status, url, body),
                    status.as_u16(),
                ))
            }
            _ => response
                .json::<OpenSecretsResponse>()
                .await
                .map_err(|e| Error::fetch(format!("Failed to decode secrets response: {}", e))),
        }
    }
}

#[async_trait]
impl SecretsProvider for HcpSecretsClient {
    #[instrument(skip(self, credentials), fields(client_id = %credentials.client_id, correlation_id = field::Empty))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken> {
        tracing::Span::current().record("correlation_id", field::display(&uuid::Uuid::new_v4()));

        if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
            return Err(Error::authentication("client id and client secret must not be empty"));
        }

        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose_secret()),
            ("grant_type", "client_credentials"),
            ("audience", HCP_AUDIENCE),
        ];

        let response = self
            .client
            .post(self.auth_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(Error::authentication(format!(
                "identity provider returned {}: {}",
                status, body
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::authentication(format!("invalid token response: {}", e)))?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                info!(expires_in = ?body.expires_in, "Obtained HCP access token");
                Ok(AccessToken::new(token, body.expires_in))
            }
            _ => Err(Error::authentication("No access token found in the response")),
        }
    }

    #[instrument(skip(self, token), fields(scope = %scope, correlation_id = field::Empty))]
    async fn fetch(&self, token: &AccessToken, scope: &SecretScope) -> Result<SecretSnapshot> {
        tracing::Span::current().record("correlation_id", field::display(&uuid::Uuid::new_v4()));

        let url = self.open_secrets_url(scope)?;
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.fetch_page(token, &url, page_token.as_deref()).await?;
            pages += 1;

            for secret in page.secrets {
                entries.push(secret.into_entry()?);
            }

            let next = page.pagination.and_then(|p| p.next_page_token).filter(|t| !t.is_empty());
            match next {
                Some(next) if !seen_tokens.insert(next.clone()) => {
                    return Err(Error::fetch(format!(
                        "HCP pagination revisited a page token after {} pages",
                        pages
                    )));
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        let snapshot = SecretSnapshot::from_entries(entries)?.with_scope(scope.clone());
        info!(secrets = snapshot.len(), pages, "Fetched secrets from HCP");
        Ok(snapshot)
    }
}

async fn error_body(response: Response) -> String {
    let text = response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", cut)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct OpenSecretsResponse {
    #[serde(default)]
    secrets: Vec<OpenSecret>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct OpenSecret {
    name: String,
    #[serde(default)]
    latest_version: Option<VersionNumber>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    static_version: Option<StaticVersion>,
}

#[derive(Deserialize)]
struct StaticVersion {
    #[serde(default)]
    version: Option<VersionNumber>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// HCP encodes 64-bit integers as JSON strings; older responses use numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionNumber {
    Number(u64),
    Text(String),
}

impl VersionNumber {
    fn parse(&self, secret: &str) -> Result<u64> {
        match self {
            VersionNumber::Number(n) => Ok(*n),
            VersionNumber::Text(s) => s
                .parse()
                .map_err(|_| Error::invalid_secret(secret, format!("version '{}' is not a number", s))),
        }
    }
}

impl OpenSecret {
    fn into_entry(self) -> Result<(String, SecretEntry)> {
        let Some(static_version) = self.static_version else {
            return Err(Error::invalid_secret(&self.name, "no static version (dynamic or rotating secret)"));
        };
        let Some(value) = static_version.value else {
            return Err(Error::invalid_secret(&self.name, "value is missing or null"));
        };

        let version = match static_version.version.as_ref().or(self.latest_version.as_ref()) {
            Some(v) => Some(v.parse(&self.name)?),
            None => None,
        };
        let metadata =
            SecretMetadata { version, created_at: static_version.created_at.or(self.created_at) };

        Ok((self.name, SecretEntry::new(value).with_metadata(metadata)))
    }
}
