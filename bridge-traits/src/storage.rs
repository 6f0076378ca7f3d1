//! Storage and File System Abstractions
//!
//! Provides a platform-agnostic trait for the small amount of file I/O the
//! monitor performs: reading client secrets and persisting the OAuth token
//! artifact between runs.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File system access trait
///
/// Abstracts file I/O operations so credential handling can be tested
/// without touching the real filesystem.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn save_token(fs: &dyn FileSystemAccess, path: &Path, json: &[u8]) -> Result<()> {
///     fs.write_file(path, Bytes::copy_from_slice(json)).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Read entire file contents
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file, replacing any previous contents
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Read a file if it exists
    ///
    /// Returns `Ok(None)` when the path does not exist.
    async fn read_file_if_exists(&self, path: &Path) -> Result<Option<Bytes>> {
        if self.exists(path).await? {
            Ok(Some(self.read_file(path).await?))
        } else {
            Ok(None)
        }
    }
}
