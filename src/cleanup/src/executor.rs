//! Executes a single cleanup run against a storage.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use retention::ExpirationPolicy;

use crate::metrics::CleanupMetrics;
use crate::storage::ResourceStorage;

/// Executor configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorConfig {
    /// Identify expired resources and log them without deleting anything.
    pub dry_run: bool,
}

/// Result of a single cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupRunResult {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Resources found in the snapshot.
    pub resources_listed: usize,
    /// Resources the policy considered expired.
    pub resources_expired: usize,
    /// Resources whose deletion was requested (zero in dry-run mode).
    pub resources_deleted: usize,
}

/// Performs cleanup in a storage of resources.
///
/// One run takes a snapshot of the storage, asks the expiration policy
/// which resources fell out of retention, and requests their deletion.
/// The policy's verdict is taken verbatim; the executor does not second-
/// guess it against the snapshot.
pub struct CleanupExecutor {
    config: ExecutorConfig,
    metrics: CleanupMetrics,
}

impl CleanupExecutor {
    pub fn new(config: ExecutorConfig, metrics: CleanupMetrics) -> Self {
        Self { config, metrics }
    }

    /// Run one cleanup pass.
    ///
    /// Any storage failure aborts the run and propagates to the caller;
    /// nothing is retried or rolled back.
    pub async fn run<S, P>(&self, storage: &S, policy: &P) -> Result<CleanupRunResult>
    where
        S: ResourceStorage,
        P: ExpirationPolicy<S::Id>,
    {
        self.metrics.record_run_started();

        match self.run_once(storage, policy).await {
            Ok(result) => {
                self.metrics.record_run_completed();
                Ok(result)
            }
            Err(e) => {
                self.metrics.record_run_failed();
                Err(e)
            }
        }
    }

    async fn run_once<S, P>(&self, storage: &S, policy: &P) -> Result<CleanupRunResult>
    where
        S: ResourceStorage,
        P: ExpirationPolicy<S::Id>,
    {
        let started_at = Utc::now();

        let resources = storage
            .list_resources()
            .await
            .context("failed to take a resource snapshot")?;

        debug!(resources = resources.len(), "resource snapshot taken");
        self.metrics.record_resources_listed(resources.len());

        let expired = policy.find_expired(&resources);
        let expired_count = expired.len();

        let deleted = if expired.is_empty() {
            info!("no expired resources found");
            0
        } else if self.config.dry_run {
            info!(
                expired = expired_count,
                "dry run, leaving expired resources in place"
            );
            0
        } else {
            storage
                .delete_resources(expired)
                .await
                .context("failed to delete expired resources")?;

            info!(deleted = expired_count, "expired resources deleted");
            expired_count
        };

        self.metrics.record_resources_deleted(deleted);

        Ok(CleanupRunResult {
            started_at,
            completed_at: Utc::now(),
            resources_listed: resources.len(),
            resources_expired: expired_count,
            resources_deleted: deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResourceStorage;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use retention::{ResourceRecord, RetentionPolicy, parse_rules};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeStorage {
        resources: Vec<ResourceRecord<String>>,
        fail_listing: bool,
        deleted: Mutex<Option<Vec<String>>>,
    }

    impl FakeStorage {
        /// Each whitespace separated entry is an age in days; the entry
        /// text doubles as the resource id.
        fn new(ages_in_days: &str) -> Self {
            let resources = ages_in_days
                .split_whitespace()
                .map(|age| {
                    let days: f64 = age.parse().unwrap();
                    ResourceRecord::new(
                        age.to_string(),
                        Duration::from_secs_f64(days * 86_400.0),
                    )
                })
                .collect();

            Self {
                resources,
                fail_listing: false,
                deleted: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            let mut storage = Self::new("");
            storage.fail_listing = true;
            storage
        }

        /// Ids passed to `delete_resources`, or `None` if it was not called.
        fn deleted(&self) -> Option<Vec<String>> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceStorage for FakeStorage {
        type Id = String;

        async fn list_resources(&self) -> Result<Vec<ResourceRecord<String>>> {
            if self.fail_listing {
                return Err(anyhow!("listing failed"));
            }
            Ok(self.resources.clone())
        }

        async fn delete_resources(&self, ids: Vec<String>) -> Result<()> {
            *self.deleted.lock().unwrap() = Some(ids);
            Ok(())
        }
    }

    /// Policy stub reporting a fixed set of ids as expired, whether or not
    /// they exist in the snapshot.
    struct FixedVerdict(Vec<String>);

    impl ExpirationPolicy<String> for FixedVerdict {
        fn find_expired(&self, _resources: &[ResourceRecord<String>]) -> Vec<String> {
            self.0.clone()
        }
    }

    fn executor() -> CleanupExecutor {
        CleanupExecutor::new(ExecutorConfig::default(), CleanupMetrics::new())
    }

    fn policy(rules: &str) -> RetentionPolicy {
        RetentionPolicy::new(parse_rules(rules).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn deletes_what_the_policy_expires() {
        let storage = FakeStorage::new("0.2 0.9 1.1 2 3");

        let result = executor().run(&storage, &policy("1:1")).await.unwrap();

        let mut deleted = storage.deleted().unwrap();
        deleted.sort();
        assert_eq!(deleted, vec!["2".to_string(), "3".to_string()]);

        assert_eq!(result.resources_listed, 5);
        assert_eq!(result.resources_expired, 2);
        assert_eq!(result.resources_deleted, 2);
    }

    #[tokio::test]
    async fn issues_no_deletion_for_an_empty_snapshot() {
        let storage = FakeStorage::new("");

        let result = executor().run(&storage, &policy("5:4 10:2")).await.unwrap();

        assert_eq!(storage.deleted(), None);
        assert_eq!(result.resources_listed, 0);
        assert_eq!(result.resources_deleted, 0);
    }

    #[tokio::test]
    async fn issues_no_deletion_when_nothing_expired() {
        let storage = FakeStorage::new("0.2 0.9");

        let result = executor().run(&storage, &policy("1:5")).await.unwrap();

        assert_eq!(storage.deleted(), None);
        assert_eq!(result.resources_expired, 0);
    }

    #[tokio::test]
    async fn trusts_the_policy_verdict_verbatim() {
        let storage = FakeStorage::new("1 2 3");
        let verdict = FixedVerdict(vec!["100".to_string(), "500".to_string()]);

        executor().run(&storage, &verdict).await.unwrap();

        assert_eq!(
            storage.deleted().unwrap(),
            vec!["100".to_string(), "500".to_string()]
        );
    }

    #[tokio::test]
    async fn dry_run_leaves_expired_resources_in_place() {
        let storage = FakeStorage::new("0.2 3");
        let executor = CleanupExecutor::new(
            ExecutorConfig { dry_run: true },
            CleanupMetrics::new(),
        );

        let result = executor.run(&storage, &policy("1:0")).await.unwrap();

        assert_eq!(storage.deleted(), None);
        assert_eq!(result.resources_expired, 1);
        assert_eq!(result.resources_deleted, 0);
    }

    #[tokio::test]
    async fn a_listing_failure_aborts_the_run() {
        let storage = FakeStorage::failing();
        let metrics = CleanupMetrics::new();
        let executor = CleanupExecutor::new(ExecutorConfig::default(), metrics.clone());

        let result = executor.run(&storage, &policy("1:1")).await;

        assert!(result.is_err());
        assert_eq!(storage.deleted(), None);
        assert_eq!(metrics.summary().runs_failed, 1);
    }
}
