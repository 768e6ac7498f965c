//! List command implementation.
//!
//! Prints every version of a container package.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use kronos_core::VersionRecord;
use kronos_registry::PackageScope;
use tracing::info;

use super::RegistryArgs;

/// Arguments for the list-versions command.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Print the versions as JSON
    #[arg(long)]
    pub json: bool,
}

/// Executes the list-versions command.
///
/// # Errors
///
/// Returns an error if credentials are missing or any page request fails.
pub async fn execute(args: ListArgs) -> Result<()> {
    let scope = args.registry.scope();
    let client = args.registry.client()?;

    let versions = client
        .list_versions(&scope)
        .await
        .with_context(|| format!("Failed to list versions of {scope}"))?;
    info!(package = %scope, count = versions.len(), "Listed versions");

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&versions).context("Failed to serialize versions")?
        );
    } else {
        print!("{}", render(&scope, &versions));
    }

    Ok(())
}

/// Renders the human-readable version listing.
pub fn render(scope: &PackageScope, versions: &[VersionRecord]) -> String {
    let mut out = format!("Found {} versions for {scope}:\n", versions.len());

    for version in versions {
        let updated = version
            .updated_at
            .map_or_else(|| "N/A".to_string(), timestamp);

        out.push_str(&format!("  - ID: {}\n", version.id));
        out.push_str(&format!("    Name: {}\n", version.display_name()));
        out.push_str(&format!("    Created: {}\n", timestamp(version.created_at)));
        out.push_str(&format!("    Updated: {updated}\n"));
        out.push_str(&format!("    Tags: {}\n", version.tags.join(", ")));
        out.push('\n');
    }

    out
}

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
