//! Authentication Abstractions
//!
//! Seams between the credential provider and its consumers:
//! - [`AccessTokenSource`] hands ready bearer tokens to API clients
//! - [`AuthCallbackListener`] captures the OAuth redirect on the host

use async_trait::async_trait;

use crate::error::Result;

/// Source of valid OAuth access tokens.
///
/// Implementations refresh and persist the underlying credential as needed;
/// callers never inspect token expiry themselves.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Return an access token that is valid for at least a short while.
    async fn access_token(&self) -> Result<String>;
}

/// Query parameters delivered to the OAuth redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: String,
}

/// Receives the authorization redirect of an installed-app OAuth flow.
///
/// Desktop hosts bind a loopback HTTP listener; other hosts may prompt the
/// user to paste the redirect URL.
#[async_trait]
pub trait AuthCallbackListener: Send + Sync {
    /// Redirect URI the authorization server should send the user back to.
    fn redirect_uri(&self) -> String;

    /// Present `auth_url` to the user and wait for the redirect.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect carries an `error` parameter, lacks a
    /// `code`, or the listener fails.
    async fn wait_for_authorization(&self, auth_url: &str) -> Result<AuthorizationResponse>;
}
