//! OAuth client secrets as downloaded from the Google Cloud console.
//!
//! The file holds a single `installed` (desktop) or `web` section:
//!
//! ```json
//! { "installed": { "client_id": "...", "client_secret": "...",
//!                  "auth_uri": "...", "token_uri": "..." } }
//! ```

use crate::error::{AuthError, Result};
use crate::oauth::OAuthConfig;
use bridge_traits::storage::FileSystemAccess;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Client registration used for the installed-app flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// Parse the contents of a client secrets file.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_slice(data)
            .map_err(|e| AuthError::InvalidClientSecrets(e.to_string()))?;

        let secrets = file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidClientSecrets(
                "expected an \"installed\" or \"web\" client section".to_string(),
            )
        })?;

        if secrets.client_id.trim().is_empty() {
            return Err(AuthError::InvalidClientSecrets(
                "client_id is empty".to_string(),
            ));
        }

        Ok(secrets)
    }

    /// Read and parse a client secrets file.
    pub async fn load(fs: &dyn FileSystemAccess, path: &Path) -> Result<Self> {
        let data = fs.read_file(path).await.map_err(|e| {
            AuthError::InvalidClientSecrets(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))
        })?;

        let secrets = Self::from_json(&data)?;
        debug!(path = %path.display(), "Loaded OAuth client secrets");
        Ok(secrets)
    }

    /// Build the flow configuration for a given redirect URI and scope set.
    pub fn oauth_config(&self, redirect_uri: String, scopes: Vec<String>) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri,
            scopes,
            auth_url: self.auth_uri.clone(),
            token_url: self.token_uri.clone(),
        }
    }
}
