//! Cleanup of expired resources in a storage.
//!
//! The storage is an abstract port with two operations: snapshot the
//! resources it holds and delete a set of them by id. [`CleanupExecutor`]
//! drives one run against a storage and an expiration policy; the
//! object-store adapter treats every object under a prefix as a resource
//! aged by its last-modified timestamp.

pub mod executor;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use executor::{CleanupExecutor, CleanupRunResult, ExecutorConfig};
pub use metrics::{CleanupMetrics, MetricsSummary};
pub use storage::{LoggingStorage, ObjectStoreStorage, ResourceStorage};
