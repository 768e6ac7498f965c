//! CLI commands and argument parsing.

pub mod cleanup;
pub mod list;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kronos_registry::{
    CredentialProvider, GitHubTokenProvider, PackageScope, RegistryClient, RegistryConfig,
    StaticTokenProvider, DEFAULT_API_URL,
};

/// Kronos - container image version retention for GitHub Container Registry
#[derive(Parser)]
#[command(name = "kronos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List all versions of a container package
    ListVersions(list::ListArgs),

    /// Remove stale versions of a container package
    CleanupVersions(cleanup::CleanupArgs),

    /// Print version information
    Version,
}

/// Registry connection arguments shared by every package command.
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Package owner (`user/NAME` or `org/NAME`)
    #[arg(long, env = "KRONOS_NAMESPACE")]
    pub namespace: String,

    /// Container package name
    #[arg(long, env = "KRONOS_PACKAGE")]
    pub package: String,

    /// GitHub API base URL
    #[arg(long, env = "KRONOS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Bearer token (defaults to `GITHUB_TOKEN`, then `gh auth token`)
    #[arg(long, env = "KRONOS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl RegistryArgs {
    /// Returns the package the command operates on.
    pub fn scope(&self) -> PackageScope {
        PackageScope::new(self.namespace.as_str(), self.package.as_str())
    }

    /// Picks the credential source: an explicit token wins over discovery.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        match &self.token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.as_str())),
            None => Arc::new(GitHubTokenProvider::new()),
        }
    }

    /// Builds the registry client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn client(&self) -> Result<RegistryClient> {
        let config = RegistryConfig::new(self.api_url.as_str())
            .with_timeout(Duration::from_secs(self.timeout));
        RegistryClient::new(config, self.credentials()).context("Failed to create registry client")
    }
}
