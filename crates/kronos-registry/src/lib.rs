//! # Kronos Registry
//!
//! GitHub Container Registry client for Kronos cleanup runs.
//!
//! ## Features
//!
//! - **Version listing**: Follows `Link` pagination until the last page
//! - **Version removal**: Single-version deletes with a dry-run mode
//! - **Credentials**: `GITHUB_TOKEN` or `gh auth token`, cached per provider
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kronos_registry::{GitHubTokenProvider, PackageScope, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::new(
//!         RegistryConfig::default(),
//!         Arc::new(GitHubTokenProvider::new()),
//!     )?;
//!
//!     let scope = PackageScope::new("org/acme", "api");
//!     let versions = client.list_versions(&scope).await?;
//!     println!("{} versions", versions.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RegistryClient                           │
//! │  ┌──────────────────────┐   ┌────────────────────────────┐  │
//! │  │ CredentialProvider   │   │ HttpTransport              │  │
//! │  │ (env / gh CLI)       │   │ (reqwest)                  │  │
//! │  └──────────────────────┘   └────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              GitHub packages REST API                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod credentials;
mod error;
mod transport;

pub use client::{next_page_url, DeletionExecutor, RegistryClient, Removal, VersionSource};
pub use config::{PackageScope, RegistryConfig, DEFAULT_API_URL, GITHUB_API_VERSION, PAGE_SIZE};
pub use credentials::{CredentialProvider, GitHubTokenProvider, StaticTokenProvider, TOKEN_ENV_VAR};
pub use error::RegistryError;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
