//! Token Persistence
//!
//! Persists OAuth tokens as a JSON file so later runs can skip the
//! interactive authorization.
//!
//! ## Security Features
//!
//! - Token values are never logged or exposed in error messages
//! - The file is written through [`FileSystemAccess`], which the desktop host
//!   configures to create owner-only files
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{OAuthTokens, TokenStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::FileSystemAccess;
//! # async fn example(fs: Arc<dyn FileSystemAccess>, tokens: OAuthTokens) -> core_auth::Result<()> {
//! let store = TokenStore::new(fs, "token.json");
//!
//! store.save(&tokens).await?;
//! let loaded = store.load().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// JSON file storage for OAuth tokens
#[derive(Clone)]
pub struct TokenStore {
    fs: Arc<dyn FileSystemAccess>,
    path: PathBuf,
}

impl TokenStore {
    pub fn new(fs: Arc<dyn FileSystemAccess>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Location of the token file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load tokens from the token file.
    ///
    /// Returns:
    /// - `Ok(Some(tokens))` if the file exists and parses
    /// - `Ok(None)` if no file exists yet
    /// - `Err(AuthError::TokenCorrupted)` if the file cannot be parsed
    pub async fn load(&self) -> Result<Option<OAuthTokens>> {
        let data = self
            .fs
            .read_file_if_exists(&self.path)
            .await
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                AuthError::Storage(e.to_string())
            })?;

        let Some(data) = data else {
            debug!(path = %self.path.display(), "No token file found");
            return Ok(None);
        };

        let tokens: OAuthTokens = serde_json::from_slice(&data).map_err(|e| {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to deserialize tokens, the file may be corrupted"
            );
            AuthError::TokenCorrupted {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(
            path = %self.path.display(),
            has_refresh_token = tokens.refresh_token.is_some(),
            expires_at = %tokens.expires_at.to_rfc3339(),
            "Tokens loaded"
        );

        Ok(Some(tokens))
    }

    /// Write tokens to the token file, replacing any previous contents.
    pub async fn save(&self, tokens: &OAuthTokens) -> Result<()> {
        let json = serde_json::to_vec_pretty(tokens)
            .map_err(|e| AuthError::Storage(format!("token serialization: {}", e)))?;

        self.fs
            .write_file(&self.path, Bytes::from(json))
            .await
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "Failed to write token file");
                AuthError::Storage(e.to_string())
            })?;

        info!(
            path = %self.path.display(),
            has_refresh_token = tokens.refresh_token.is_some(),
            "Tokens saved"
        );

        Ok(())
    }
}
