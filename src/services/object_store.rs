//! Trait for reading vendor exports from object storage.

use anyhow::Result;
use bytes::Bytes;

/// Abstraction over an object store holding the AirDNA exports (e.g., S3).
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns every object key starting with `prefix`, following pagination.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Downloads the full body of the object at `key`.
    async fn get_object(&self, key: &str) -> Result<Bytes>;
}
