//! Cleanup command implementation.
//!
//! Lists a package's versions, classifies them against the retention policy
//! and removes the ones marked for deletion. Removals are simulated unless
//! `--really-remove` is given.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use kronos_audit::{new_event_id, AuditEvent, AuditLogger, DeletionEvent, RetentionEvent};
use kronos_core::{
    ClassificationResult, RetentionPolicy, DEFAULT_KEEP_PATTERN, DEFAULT_MAX_AGE_SECS,
};
use kronos_registry::{DeletionExecutor, PackageScope, Removal, VersionSource};
use tracing::{error, info, warn};

use super::list::timestamp;
use super::RegistryArgs;

/// Value `--all` must carry to mark every version for deletion.
pub const REMOVE_ALL_CONFIRMATION: &str = "yes-remove-all";

/// Arguments for the cleanup-versions command.
#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Maximum age in seconds of tagged versions to keep
    #[arg(long, default_value_t = DEFAULT_MAX_AGE_SECS)]
    pub tagged_max_age: i64,

    /// Tags matching this regex are always kept
    #[arg(long, default_value = DEFAULT_KEEP_PATTERN)]
    pub keep_tags_pattern: String,

    /// Actually delete versions (default is a dry run)
    #[arg(long)]
    pub really_remove: bool,

    /// Remove every version; must be `--all=yes-remove-all`
    #[arg(long, value_name = "CONFIRMATION")]
    pub all: Option<String>,
}

/// Executes the cleanup-versions command.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, listing fails, or a
/// removal fails.
pub async fn execute(args: CleanupArgs) -> Result<()> {
    // Validate before touching the network.
    let policy = build_policy(&args)?;

    let scope = args.registry.scope();
    let client = args.registry.client()?;

    let runner = CleanupRunner::new(&client, &client, AuditLogger::tracing());
    let summary = runner
        .run(&scope, &policy, Utc::now(), !args.really_remove)
        .await?;

    info!(
        run_id = runner.run_id(),
        kept = summary.kept,
        removed = summary.removed,
        dry_run = summary.dry_run,
        "Cleanup finished"
    );

    Ok(())
}

/// Builds the retention policy from the command arguments.
///
/// # Errors
///
/// Returns an error if `--all` carries anything but the confirmation value,
/// the max age is negative, or the keep pattern is not a valid regex.
pub fn build_policy(args: &CleanupArgs) -> Result<RetentionPolicy> {
    let force_delete_all = match args.all.as_deref() {
        None => false,
        Some(REMOVE_ALL_CONFIRMATION) => true,
        Some(other) => bail!(
            "Invalid value '{other}' for --all flag. Must be '--all={REMOVE_ALL_CONFIRMATION}'"
        ),
    };

    let policy = RetentionPolicy::from_seconds(args.tagged_max_age, &args.keep_tags_pattern)
        .context("Invalid retention policy")?;

    Ok(policy.with_force_delete_all(force_delete_all))
}

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Versions kept.
    pub kept: usize,

    /// Versions removed, or that would have been in a dry run.
    pub removed: usize,

    /// Whether removals were simulated.
    pub dry_run: bool,
}

/// Drives one cleanup run over a version source and a deletion executor.
pub struct CleanupRunner<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    executor: &'a D,
    audit: AuditLogger,
    run_id: String,
}

impl<'a, S, D> CleanupRunner<'a, S, D>
where
    S: VersionSource + ?Sized,
    D: DeletionExecutor + ?Sized,
{
    /// Creates a runner with a fresh run ID.
    pub fn new(source: &'a S, executor: &'a D, audit: AuditLogger) -> Self {
        Self {
            source,
            executor,
            audit,
            run_id: new_event_id().to_string(),
        }
    }

    /// Returns the run ID attached to every audit event.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Lists, classifies and removes versions of `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails or any removal fails. Removal stops
    /// at the first failure; versions already removed stay removed.
    pub async fn run(
        &self,
        scope: &PackageScope,
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<CleanupSummary> {
        info!(run_id = %self.run_id, package = %scope, dry_run, "Starting cleanup");

        let versions = self
            .source
            .fetch(scope)
            .await
            .with_context(|| format!("Failed to list versions of {scope}"))?;

        let classification = policy.classify(&versions, now);

        info!("Found {} versions from {scope}:", classification.len());
        let package = scope.to_string();
        for result in classification.results() {
            let reason = policy.explain(&result.reason);
            report(result, &reason);
            self.emit(
                &RetentionEvent::from_result(&package, result)
                    .with_reason(reason)
                    .with_run_id(&self.run_id),
            );
        }

        let (kept, _) = classification.counts();
        let to_remove: Vec<u64> = classification.to_delete().map(|r| r.version.id).collect();

        if to_remove.is_empty() {
            info!("No versions to remove from {scope}.");
            return Ok(CleanupSummary {
                kept,
                removed: 0,
                dry_run,
            });
        }

        info!(
            "Removing {} (really_remove: {}) versions from {scope}:",
            to_remove.len(),
            !dry_run
        );
        let removed = self.remove_all(scope, &to_remove, dry_run).await?;
        info!("Successfully removed {removed} versions.");

        Ok(CleanupSummary {
            kept,
            removed,
            dry_run,
        })
    }

    /// Removes `ids` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the failing removal's error, annotated with how many versions
    /// were removed before it.
    pub async fn remove_all(
        &self,
        scope: &PackageScope,
        ids: &[u64],
        dry_run: bool,
    ) -> Result<usize> {
        let package = scope.to_string();

        for (done, &id) in ids.iter().enumerate() {
            match self.executor.remove(scope, id, dry_run).await {
                Ok(Removal::Removed) => {
                    self.emit(&DeletionEvent::removed(&package, id).with_run_id(&self.run_id));
                }
                Ok(Removal::Simulated) => {
                    self.emit(&DeletionEvent::simulated(&package, id).with_run_id(&self.run_id));
                }
                Err(e) => {
                    error!(package = %scope, version_id = id, error = %e, "Removal failed");
                    self.emit(
                        &DeletionEvent::failed(&package, id, &e.to_string())
                            .with_run_id(&self.run_id),
                    );
                    return Err(anyhow::Error::new(e).context(format!(
                        "Failed to remove version {id} of {scope} after removing {done} of {} versions",
                        ids.len()
                    )));
                }
            }
        }

        Ok(ids.len())
    }

    fn emit<E: AuditEvent>(&self, event: &E) {
        if let Err(e) = self.audit.log(event) {
            warn!(error = %e, "Failed to record audit event");
        }
    }
}

fn report(result: &ClassificationResult, reason: &str) {
    let version = &result.version;
    info!(
        "  - ID: {}, Name: {}, Tags: {}",
        version.id,
        version.display_name(),
        version.tags.join(", ")
    );
    info!("    Created: {}", timestamp(version.created_at));
    info!("    Action: {}", result.decision);
    info!("    Reason: {reason}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Duration;
    use kronos_audit::InMemoryBackend;
    use kronos_core::VersionRecord;
    use kronos_registry::RegistryError;

    // =========================================================================
    // Test Helpers
    // =========================================================================

    struct FixedSource(Vec<VersionRecord>);

    #[async_trait]
    impl VersionSource for FixedSource {
        async fn fetch(&self, _scope: &PackageScope) -> Result<Vec<VersionRecord>, RegistryError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl VersionSource for FailingSource {
        async fn fetch(&self, _scope: &PackageScope) -> Result<Vec<VersionRecord>, RegistryError> {
            Err(RegistryError::HttpError {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    /// Records removal calls and fails on one chosen version.
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(u64, bool)>>,
        fail_on: Option<u64>,
    }

    impl RecordingExecutor {
        fn failing_on(id: u64) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(id),
            }
        }

        fn calls(&self) -> Vec<(u64, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DeletionExecutor for RecordingExecutor {
        async fn remove(
            &self,
            _scope: &PackageScope,
            version_id: u64,
            dry_run: bool,
        ) -> Result<Removal, RegistryError> {
            self.calls.lock().unwrap().push((version_id, dry_run));
            if self.fail_on == Some(version_id) {
                return Err(RegistryError::HttpError {
                    status: 403,
                    message: "Forbidden".to_string(),
                });
            }
            Ok(if dry_run {
                Removal::Simulated
            } else {
                Removal::Removed
            })
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn scope() -> PackageScope {
        PackageScope::new("org/acme", "api")
    }

    /// Kept release, its untagged child, a stale tagged build and a stray orphan.
    fn versions() -> Vec<VersionRecord> {
        let t = now() - Duration::days(1);
        vec![
            VersionRecord::new(1, ["latest-main"], t - Duration::days(30)),
            VersionRecord::new(
                2,
                Vec::<String>::new(),
                t - Duration::days(30) + Duration::seconds(2),
            ),
            VersionRecord::new(3, ["feature-x"], t - Duration::days(20)),
            VersionRecord::new(4, Vec::<String>::new(), t - Duration::days(10)),
        ]
    }

    fn args(all: Option<&str>) -> CleanupArgs {
        CleanupArgs {
            registry: RegistryArgs {
                namespace: "org/acme".to_string(),
                package: "api".to_string(),
                api_url: "https://api.github.com".to_string(),
                token: None,
                timeout: 30,
            },
            tagged_max_age: DEFAULT_MAX_AGE_SECS,
            keep_tags_pattern: DEFAULT_KEEP_PATTERN.to_string(),
            really_remove: false,
            all: all.map(ToString::to_string),
        }
    }

    fn memory_logger() -> (AuditLogger, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        let logger = AuditLogger::builder().with_backend(backend.clone()).build();
        (logger, backend)
    }

    // =========================================================================
    // Policy Construction
    // =========================================================================

    #[test]
    fn test_build_policy_defaults() {
        let policy = build_policy(&args(None)).unwrap();
        assert!(!policy.is_force_delete_all());
        assert_eq!(policy.max_age(), Duration::seconds(604_800));
    }

    #[test]
    fn test_build_policy_remove_all_confirmed() {
        let policy = build_policy(&args(Some("yes-remove-all"))).unwrap();
        assert!(policy.is_force_delete_all());
    }

    #[test]
    fn test_build_policy_rejects_wrong_confirmation() {
        let err = build_policy(&args(Some("yes"))).unwrap_err();
        assert!(err.to_string().contains("--all=yes-remove-all"));
    }

    #[test]
    fn test_build_policy_rejects_bad_pattern() {
        let mut args = args(None);
        args.keep_tags_pattern = "(unclosed".to_string();
        assert!(build_policy(&args).is_err());
    }

    #[test]
    fn test_build_policy_rejects_negative_age() {
        let mut args = args(None);
        args.tagged_max_age = -1;
        assert!(build_policy(&args).is_err());
    }

    // =========================================================================
    // Cleanup Runs
    // =========================================================================

    #[tokio::test]
    async fn test_dry_run_simulates_removals_in_order() {
        let source = FixedSource(versions());
        let executor = RecordingExecutor::default();
        let (logger, backend) = memory_logger();
        let runner = CleanupRunner::new(&source, &executor, logger);

        let summary = runner
            .run(&scope(), &RetentionPolicy::default(), now(), true)
            .await
            .unwrap();

        assert_eq!(
            summary,
            CleanupSummary {
                kept: 2,
                removed: 2,
                dry_run: true
            }
        );
        assert_eq!(executor.calls(), vec![(3, true), (4, true)]);

        let events = backend.events();
        assert_eq!(events.len(), 6);
        assert!(events.iter().all(|e| e.contains(runner.run_id())));
        assert_eq!(
            events
                .iter()
                .filter(|e| e.contains("\"outcome\":\"simulated\""))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_audit_reasons_name_policy_parameters() {
        let source = FixedSource(versions());
        let executor = RecordingExecutor::default();
        let (logger, backend) = memory_logger();
        let runner = CleanupRunner::new(&source, &executor, logger);

        runner
            .run(&scope(), &RetentionPolicy::default(), now(), true)
            .await
            .unwrap();

        let events = backend.events();
        assert!(events
            .iter()
            .any(|e| e.contains("matches keep pattern '^(latest-|git-tag-)'")));
        assert!(events
            .iter()
            .any(|e| e.contains("older than maximum age '604800s'")));
    }

    #[tokio::test]
    async fn test_live_run_removes() {
        let source = FixedSource(versions());
        let executor = RecordingExecutor::default();
        let runner = CleanupRunner::new(&source, &executor, AuditLogger::tracing());

        let summary = runner
            .run(&scope(), &RetentionPolicy::default(), now(), false)
            .await
            .unwrap();

        assert_eq!(summary.removed, 2);
        assert!(!summary.dry_run);
        assert_eq!(executor.calls(), vec![(3, false), (4, false)]);
    }

    #[tokio::test]
    async fn test_nothing_to_remove() {
        let source = FixedSource(vec![VersionRecord::new(1, ["latest-main"], now())]);
        let executor = RecordingExecutor::default();
        let runner = CleanupRunner::new(&source, &executor, AuditLogger::tracing());

        let summary = runner
            .run(&scope(), &RetentionPolicy::default(), now(), false)
            .await
            .unwrap();

        assert_eq!(summary.kept, 1);
        assert_eq!(summary.removed, 0);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_all_override() {
        let source = FixedSource(versions());
        let executor = RecordingExecutor::default();
        let runner = CleanupRunner::new(&source, &executor, AuditLogger::tracing());
        let policy = RetentionPolicy::default().with_force_delete_all(true);

        let summary = runner.run(&scope(), &policy, now(), true).await.unwrap();

        assert_eq!(summary.kept, 0);
        assert_eq!(
            executor.calls(),
            vec![(1, true), (2, true), (3, true), (4, true)]
        );
    }

    #[tokio::test]
    async fn test_removal_stops_at_first_failure() {
        let source = FixedSource(versions());
        let executor = RecordingExecutor::failing_on(3);
        let (logger, backend) = memory_logger();
        let runner = CleanupRunner::new(&source, &executor, logger);

        let err = runner
            .run(&scope(), &RetentionPolicy::default(), now(), false)
            .await
            .unwrap_err();

        assert_eq!(executor.calls(), vec![(3, false)]);
        assert!(err
            .to_string()
            .contains("Failed to remove version 3 of org/acme/api after removing 0 of 2 versions"));
        assert!(backend
            .events()
            .iter()
            .any(|e| e.contains("\"outcome\":\"failure\"")));
    }

    #[tokio::test]
    async fn test_listing_failure_removes_nothing() {
        let executor = RecordingExecutor::default();
        let runner = CleanupRunner::new(&FailingSource, &executor, AuditLogger::tracing());

        let err = runner
            .run(&scope(), &RetentionPolicy::default(), now(), false)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to list versions of org/acme/api"));
        assert!(executor.calls().is_empty());
    }
}
