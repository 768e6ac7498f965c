//! Configuration types for the registry client.

use std::fmt;
use std::time::Duration;

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub REST API version sent with every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Versions requested per listing page.
pub const PAGE_SIZE: u32 = 100;

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// API base URL (e.g., "<https://api.github.com>").
    pub api_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given API URL.
    ///
    /// A trailing slash is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use kronos_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://ghe.example.com/api/v3/");
    /// assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
    /// ```
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("kronos/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the URL of the first version listing page for a package.
    ///
    /// # Examples
    ///
    /// ```
    /// use kronos_registry::{PackageScope, RegistryConfig};
    ///
    /// let config = RegistryConfig::default();
    /// let scope = PackageScope::new("user/octo", "app");
    /// assert_eq!(
    ///     config.versions_url(&scope),
    ///     "https://api.github.com/user/octo/packages/container/app/versions?per_page=100"
    /// );
    /// ```
    #[must_use]
    pub fn versions_url(&self, scope: &PackageScope) -> String {
        format!(
            "{}/{}/packages/container/{}/versions?per_page={PAGE_SIZE}",
            self.api_url, scope.namespace, scope.package
        )
    }

    /// Returns the URL of a single package version.
    #[must_use]
    pub fn version_url(&self, scope: &PackageScope, version_id: u64) -> String {
        format!(
            "{}/{}/packages/container/{}/versions/{version_id}",
            self.api_url, scope.namespace, scope.package
        )
    }
}

/// A container package: namespace plus package name.
///
/// The namespace is `user/<username>` or `org/<orgname>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageScope {
    /// Namespace path, e.g. `org/acme`.
    pub namespace: String,

    /// Package name.
    pub package: String,
}

impl PackageScope {
    /// Creates a new package scope.
    #[must_use]
    pub fn new(namespace: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().trim_matches('/').to_string(),
            package: package.into(),
        }
    }
}

impl fmt::Display for PackageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.package)
    }
}
