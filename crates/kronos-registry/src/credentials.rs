//! Registry credentials.
//!
//! A [`CredentialProvider`] hands out bearer tokens. Providers are passed
//! explicitly to the [`RegistryClient`](crate::RegistryClient); there is no
//! process-wide default instance.

use std::fmt;
use std::io::ErrorKind;
use std::process::Command;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::RegistryError;

/// Environment variable checked first for a token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Source of bearer tokens for registry requests.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Returns a token, resolving and caching it on first use.
    ///
    /// This is a blocking call: a first resolution may spawn a subprocess.
    /// The client resolves once per listing or removal, never per page.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AuthenticationFailed`] if no token can be
    /// obtained.
    fn token(&self) -> Result<String, RegistryError>;

    /// Drops any cached token so the next call resolves a fresh one.
    fn invalidate(&self);
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves a GitHub token from the environment or the GitHub CLI.
///
/// Resolution order:
/// 1. the cached token, if any
/// 2. the `GITHUB_TOKEN` environment variable
/// 3. the output of `gh auth token`
///
/// The first token found is cached for the lifetime of the provider. The
/// cache lock is not held while the environment or `gh` is consulted.
pub struct GitHubTokenProvider {
    env: EnvLookup,
    gh_program: String,
    cached: Mutex<Option<String>>,
}

impl fmt::Debug for GitHubTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubTokenProvider")
            .field("gh_program", &self.gh_program)
            .field("cached", &self.cached.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl Default for GitHubTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubTokenProvider {
    /// Creates a provider reading the process environment and running `gh`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Arc::new(|key| std::env::var(key).ok()),
            gh_program: "gh".to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Replaces the environment lookup.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Replaces the GitHub CLI executable.
    #[must_use]
    pub fn with_gh_program(mut self, program: impl Into<String>) -> Self {
        self.gh_program = program.into();
        self
    }

    fn resolve(&self) -> Result<String, RegistryError> {
        if let Some(token) = self.token_from_env() {
            debug!("Using token from {TOKEN_ENV_VAR}");
            Ok(token)
        } else if let Some(token) = self.token_from_gh_cli() {
            debug!("Using token from GitHub CLI");
            Ok(token)
        } else {
            Err(RegistryError::AuthenticationFailed {
                message: format!(
                    "Unable to retrieve GitHub token. Either set the {TOKEN_ENV_VAR} \
                     environment variable, or install and authenticate the GitHub CLI (gh)"
                ),
            })
        }
    }

    fn token_from_env(&self) -> Option<String> {
        (self.env)(TOKEN_ENV_VAR)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn token_from_gh_cli(&self) -> Option<String> {
        let output = match Command::new(&self.gh_program).args(["auth", "token"]).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(program = %self.gh_program, "GitHub CLI not installed");
                return None;
            }
            Err(e) => {
                debug!(program = %self.gh_program, error = %e, "Failed to run GitHub CLI");
                return None;
            }
        };

        if !output.status.success() {
            debug!(status = %output.status, "GitHub CLI returned an error");
            return None;
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!token.is_empty()).then_some(token)
    }
}

impl CredentialProvider for GitHubTokenProvider {
    fn token(&self) -> Result<String, RegistryError> {
        if let Some(token) = self.cached.lock().clone() {
            return Ok(token);
        }

        let token = self.resolve()?;

        // A concurrent caller may have resolved first; its token wins.
        Ok(self.cached.lock().get_or_insert(token).clone())
    }

    fn invalidate(&self) {
        *self.cached.lock() = None;
    }
}

/// A fixed token, e.g. passed on the command line.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Creates a provider that always returns `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

impl CredentialProvider for StaticTokenProvider {
    fn token(&self) -> Result<String, RegistryError> {
        Ok(self.token.clone())
    }

    // A static token cannot be refreshed.
    fn invalidate(&self) {}
}
