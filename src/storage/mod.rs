pub mod gcs;

use crate::errors::Result;
use async_trait::async_trait;
use std::path::Path;

/// Object store bound to a single bucket
#[async_trait]
pub trait ObjectStore {
    /// Bucket every call operates on
    fn bucket(&self) -> &str;

    /// Whether an object with this name exists in the bucket
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Upload the bytes of `local_path` as object `name`
    async fn upload(&self, name: &str, local_path: &Path) -> Result<()>;
}
