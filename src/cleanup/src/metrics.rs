//! Cleanup metrics tracking.
//!
//! Thread-safe counters over the lifetime of the process, using atomics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Thread-safe metrics for cleanup runs.
#[derive(Debug, Clone, Default)]
pub struct CleanupMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    runs_started: AtomicUsize,
    runs_completed: AtomicUsize,
    runs_failed: AtomicUsize,
    resources_listed: AtomicU64,
    resources_deleted: AtomicU64,
}

impl CleanupMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a cleanup run.
    pub fn record_run_started(&self) {
        self.inner.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed cleanup run.
    pub fn record_run_completed(&self) {
        self.inner.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed cleanup run.
    pub fn record_run_failed(&self) {
        self.inner.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the size of a resource snapshot.
    pub fn record_resources_listed(&self, count: usize) {
        self.inner
            .resources_listed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record the amount of resources whose deletion was requested.
    pub fn record_resources_deleted(&self, count: usize) {
        self.inner
            .resources_deleted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Snapshot of the current counter values.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            runs_started: self.inner.runs_started.load(Ordering::Relaxed),
            runs_completed: self.inner.runs_completed.load(Ordering::Relaxed),
            runs_failed: self.inner.runs_failed.load(Ordering::Relaxed),
            resources_listed: self.inner.resources_listed.load(Ordering::Relaxed),
            resources_deleted: self.inner.resources_deleted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the cleanup metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    pub runs_started: usize,
    pub runs_completed: usize,
    pub runs_failed: usize,
    pub resources_listed: u64,
    pub resources_deleted: u64,
}

impl MetricsSummary {
    /// Log the summary at info level.
    pub fn log(&self) {
        tracing::info!(
            runs_started = self.runs_started,
            runs_completed = self.runs_completed,
            runs_failed = self.runs_failed,
            resources_listed = self.resources_listed,
            resources_deleted = self.resources_deleted,
            "cleanup metrics summary"
        );
    }
}
