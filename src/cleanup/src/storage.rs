//! The storage port and its object-store backed implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use retention::ResourceRecord;

/// A storage of arbitrary identifiable resources.
///
/// The two operations are the whole contract: snapshot what is stored and
/// delete a set of resources by id. Errors are opaque to the caller and
/// abort the current run; nothing is retried here.
#[async_trait]
pub trait ResourceStorage: Send + Sync {
    /// The type of a resource identifier.
    type Id: Clone + Send + Sync;

    /// Take a snapshot of all resources currently in the storage.
    async fn list_resources(&self) -> Result<Vec<ResourceRecord<Self::Id>>>;

    /// Delete the resources with the given identifiers. No ordering is
    /// guaranteed among the deletions.
    async fn delete_resources(&self, ids: Vec<Self::Id>) -> Result<()>;
}

/// Resource storage over an object store.
///
/// Every object under the optional prefix is a resource, identified by its
/// path and aged by its last-modified timestamp.
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
    prefix: Option<ObjectPath>,
}

impl ObjectStoreStorage {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            prefix: None,
        }
    }

    /// Restrict the storage to objects under `prefix`.
    pub fn with_prefix(store: Arc<dyn ObjectStore>, prefix: impl Into<ObjectPath>) -> Self {
        Self {
            store,
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl ResourceStorage for ObjectStoreStorage {
    type Id = String;

    async fn list_resources(&self) -> Result<Vec<ResourceRecord<String>>> {
        let now = Utc::now();

        let mut objects = self.store.list(self.prefix.as_ref());
        let mut resources = Vec::new();

        while let Some(meta) = objects
            .try_next()
            .await
            .context("failed to list objects")?
        {
            // An object written after the snapshot timestamp counts as age
            // zero; ages are never negative.
            let age = (now - meta.last_modified)
                .to_std()
                .unwrap_or(Duration::ZERO);

            resources.push(ResourceRecord::new(meta.location.to_string(), age));
        }

        Ok(resources)
    }

    async fn delete_resources(&self, ids: Vec<String>) -> Result<()> {
        for id in ids {
            let path = ObjectPath::from(id.as_str());
            self.store
                .delete(&path)
                .await
                .with_context(|| format!("failed to delete object {id}"))?;
        }

        Ok(())
    }
}

/// Observational decorator that logs every storage call and its outcome.
///
/// Arguments, results and errors pass through unchanged.
pub struct LoggingStorage<S> {
    inner: S,
}

impl<S> LoggingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ResourceStorage> ResourceStorage for LoggingStorage<S> {
    type Id = S::Id;

    async fn list_resources(&self) -> Result<Vec<ResourceRecord<S::Id>>> {
        tracing::debug!("listing resources");

        match self.inner.list_resources().await {
            Ok(resources) => {
                tracing::debug!(resources = resources.len(), "resources listed");
                Ok(resources)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list resources");
                Err(e)
            }
        }
    }

    async fn delete_resources(&self, ids: Vec<S::Id>) -> Result<()> {
        tracing::debug!(resources = ids.len(), "deleting resources");

        match self.inner.delete_resources(ids).await {
            Ok(()) => {
                tracing::debug!("resources deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to delete resources");
                Err(e)
            }
        }
    }
}
