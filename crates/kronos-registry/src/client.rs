//! GitHub Container Registry client.
//!
//! Provides the two registry-facing halves of a cleanup run: listing every
//! version of a package ([`VersionSource`]) and removing single versions
//! ([`DeletionExecutor`]).

use std::sync::Arc;

use async_trait::async_trait;
use kronos_core::{PackageVersion, VersionRecord};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{PackageScope, RegistryConfig, GITHUB_API_VERSION};
use crate::credentials::CredentialProvider;
use crate::error::RegistryError;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// Produces every version of a package.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetches all versions, following pagination to the last page.
    async fn fetch(&self, scope: &PackageScope) -> Result<Vec<VersionRecord>, RegistryError>;
}

/// Removes package versions.
#[async_trait]
pub trait DeletionExecutor: Send + Sync {
    /// Removes one version, or only logs the removal when `dry_run` is set.
    async fn remove(
        &self,
        scope: &PackageScope,
        version_id: u64,
        dry_run: bool,
    ) -> Result<Removal, RegistryError>;
}

/// Result of a successful removal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The version was deleted from the registry.
    Removed,
    /// Dry run: nothing was sent to the registry.
    Simulated,
}

/// Client for the GitHub packages API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    config: RegistryConfig,
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn HttpTransport>,
}

impl RegistryClient {
    /// Creates a new registry client using `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use kronos_registry::{GitHubTokenProvider, RegistryClient, RegistryConfig};
    ///
    /// let client = RegistryClient::new(
    ///     RegistryConfig::default(),
    ///     Arc::new(GitHubTokenProvider::new()),
    /// )?;
    /// # Ok::<(), kronos_registry::RegistryError>(())
    /// ```
    pub fn new(
        config: RegistryConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, RegistryError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, credentials, transport))
    }

    /// Creates a client over an explicit transport.
    #[must_use]
    pub fn with_transport(
        config: RegistryConfig,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
        }
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Lists every version of a package.
    ///
    /// Pages are requested one after another; each page's `Link` header
    /// names the next one.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if no token is available, a
    /// transport error if any page request fails or cannot be decoded, and
    /// [`RegistryError::Config`] if a version carries a malformed
    /// creation timestamp.
    pub async fn list_versions(
        &self,
        scope: &PackageScope,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        let first = parse_url(&self.config.versions_url(scope))?;
        let token = self.credentials.token()?;

        let mut versions = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next.take() {
            info!(url = %url, "Fetching versions");
            let response = self.transport.get(url.as_str(), self.headers(&token)?).await?;
            self.ensure_success(&response)?;

            let page: Vec<PackageVersion> = serde_json::from_slice(&response.body)?;
            debug!(count = page.len(), "Fetched page");
            for wire in page {
                versions.push(VersionRecord::try_from(wire)?);
            }

            next = response.link.as_deref().and_then(|link| next_page_url(&url, link));
        }

        Ok(versions)
    }

    /// Removes a single package version.
    ///
    /// In dry-run mode no token is requested and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if no token is available, and a
    /// transport error on any non-success response.
    pub async fn remove_version(
        &self,
        scope: &PackageScope,
        version_id: u64,
        dry_run: bool,
    ) -> Result<Removal, RegistryError> {
        if dry_run {
            info!(package = %scope, version_id, "[DRY RUN] Would remove version");
            return Ok(Removal::Simulated);
        }

        let url = parse_url(&self.config.version_url(scope, version_id))?;
        let token = self.credentials.token()?;

        let response = self.transport.delete(url.as_str(), self.headers(&token)?).await?;
        self.ensure_success(&response)?;

        info!(package = %scope, version_id, "Removed version");
        Ok(Removal::Removed)
    }

    fn headers(&self, token: &str) -> Result<HeaderMap, RegistryError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(GITHUB_API_VERSION));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                RegistryError::AuthenticationFailed {
                    message: "Invalid token".to_string(),
                }
            })?,
        );
        Ok(headers)
    }

    /// Maps non-success statuses to errors. A 401 also drops the cached
    /// token so a later request does not reuse it.
    fn ensure_success(&self, response: &HttpResponse) -> Result<(), RegistryError> {
        if response.status.is_success() {
            return Ok(());
        }

        if response.status == StatusCode::UNAUTHORIZED {
            warn!("Registry rejected credentials, clearing cached token");
            self.credentials.invalidate();
        }

        Err(RegistryError::HttpError {
            status: response.status.as_u16(),
            message: response.text(),
        })
    }
}

#[async_trait]
impl VersionSource for RegistryClient {
    async fn fetch(&self, scope: &PackageScope) -> Result<Vec<VersionRecord>, RegistryError> {
        self.list_versions(scope).await
    }
}

#[async_trait]
impl DeletionExecutor for RegistryClient {
    async fn remove(
        &self,
        scope: &PackageScope,
        version_id: u64,
        dry_run: bool,
    ) -> Result<Removal, RegistryError> {
        self.remove_version(scope, version_id, dry_run).await
    }
}

fn parse_url(url: &str) -> Result<Url, RegistryError> {
    Url::parse(url).map_err(|_| RegistryError::InvalidUrl {
        url: url.to_string(),
    })
}

/// Extracts the `rel="next"` target from a `Link` header.
///
/// Relative targets are resolved against the current page URL.
///
/// # Examples
///
/// ```
/// use kronos_registry::next_page_url;
/// use url::Url;
///
/// let current = Url::parse("https://api.github.com/user/o/versions?per_page=100").unwrap();
/// let link = concat!(
///     r#"<https://api.github.com/user/o/versions?page=2&per_page=100>; rel="next", "#,
///     r#"<https://api.github.com/user/o/versions?page=9&per_page=100>; rel="last""#,
/// );
///
/// let next = next_page_url(&current, link).unwrap();
/// assert_eq!(next.query(), Some("page=2&per_page=100"));
/// ```
#[must_use]
pub fn next_page_url(current: &Url, link_header: &str) -> Option<Url> {
    link_header
        .split(',')
        .find(|entry| entry.contains("rel=\"next\""))
        .and_then(|entry| {
            let start = entry.find('<')? + 1;
            let end = entry[start..].find('>')? + start;
            current.join(&entry[start..end]).ok()
        })
}
