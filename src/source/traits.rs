use async_trait::async_trait;

use super::model::DirectoryEntry;
use crate::error::ListingError;

/// A remote directory tree that can be listed one level at a time.
#[async_trait]
pub trait ContentsSource: Send + Sync {
    /// List the entries directly under `path`. The empty path is the root.
    async fn get_contents(&self, path: &str) -> Result<Vec<DirectoryEntry>, ListingError>;
}
