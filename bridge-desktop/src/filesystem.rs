//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Relative paths are resolved against `base_dir` when one is configured,
/// otherwise against the process working directory.
pub struct TokioFileSystem {
    base_dir: Option<PathBuf>,
    private_files: bool,
}

impl TokioFileSystem {
    /// Create a file system accessor rooted at the working directory
    pub fn new() -> Self {
        Self {
            base_dir: None,
            private_files: false,
        }
    }

    /// Create a file system accessor that resolves relative paths against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            private_files: false,
        }
    }

    /// Restrict written files to owner read/write (Unix only)
    pub fn with_private_files(mut self, private: bool) -> Self {
        self.private_files = private;
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::NotFound(e.to_string())
        } else {
            BridgeError::Io(e)
        }
    }

    #[cfg(unix)]
    async fn restrict_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(Self::map_io_error)
    }

    #[cfg(not(unix))]
    async fn restrict_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }
}

impl Default for TokioFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(self.resolve(path))
            .await
            .map_err(Self::map_io_error)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.resolve(path);
        fs::create_dir_all(&path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let path = self.resolve(path);
        let data = fs::read(&path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        let path = self.resolve(path);

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(Self::map_io_error)?;
        }

        fs::write(&path, data.as_ref())
            .await
            .map_err(Self::map_io_error)?;

        if self.private_files {
            Self::restrict_permissions(&path).await?;
        }

        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }
}
