//! Object store construction from a storage DSN.

use std::sync::Arc;

use anyhow::Result;
use object_store::{
    ObjectStore, aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory,
};
use url::Url;

use crate::config::StorageConfig;

/// Create an object store for the configured storage location.
pub fn create_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    create_object_store_from_dsn(&config.dsn)
}

/// Create an object store from a DSN string.
///
/// Supported schemes: `file:///path/to/dir`, `memory://` and `s3://bucket`
/// (S3 credentials and region are taken from the environment).
pub fn create_object_store_from_dsn(dsn: &str) -> Result<Arc<dyn ObjectStore>> {
    let url =
        Url::parse(dsn).map_err(|e| anyhow::anyhow!("invalid storage DSN '{dsn}': {e}"))?;

    match url.scheme() {
        "file" => {
            let path = url.path();
            if path.is_empty() || path == "/" {
                return Err(anyhow::anyhow!(
                    "file DSN must specify a directory: file:///path/to/backups"
                ));
            }
            Ok(Arc::new(LocalFileSystem::new_with_prefix(path)?))
        }
        "memory" => Ok(Arc::new(InMemory::new())),
        "s3" => {
            let bucket = url
                .host_str()
                .ok_or_else(|| anyhow::anyhow!("s3 DSN must specify a bucket: s3://bucket"))?;
            let store = AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()?;
            Ok(Arc::new(store))
        }
        scheme => Err(anyhow::anyhow!(
            "unsupported storage scheme: {scheme}. Supported: file, memory, s3"
        )),
    }
}
