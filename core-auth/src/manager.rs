//! # Credential Manager
//!
//! Orchestrates loading, refreshing and (when needed) interactively
//! obtaining the OAuth credential for the Drive account.
//!
//! ## Overview
//!
//! At startup [`CredentialManager::obtain_tokens`] resolves a usable token:
//!
//! ```text
//! token file ──► valid? ──yes──► use
//!                  │no
//!                  ▼
//!            refresh token? ──yes──► refresh ──ok──► save, use
//!                  │no                   │failed
//!                  ▼                     ▼
//!            interactive consent ──► exchange code ──► save, use
//! ```
//!
//! Afterwards the manager serves as the [`AccessTokenSource`] for API
//! clients, refreshing and persisting the token whenever it is within five
//! minutes of expiry.

use crate::error::{AuthError, Result};
use crate::oauth::OAuthFlowManager;
use crate::token_store::TokenStore;
use crate::types::OAuthTokens;
use async_trait::async_trait;
use bridge_traits::auth::{AccessTokenSource, AuthCallbackListener};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::time::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, instrument, warn};

/// Default timeout for a token endpoint round trip (2 minutes)
const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// Buffer time before token expiration to trigger refresh (5 minutes)
const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(300);

/// Credential orchestrator for a single account.
pub struct CredentialManager {
    flow: OAuthFlowManager,
    token_store: TokenStore,
    listener: Arc<dyn AuthCallbackListener>,
    clock: Arc<dyn Clock>,
    /// Current token set; the lock also serializes refreshes
    current: Mutex<Option<OAuthTokens>>,
}

impl CredentialManager {
    pub fn new(
        flow: OAuthFlowManager,
        token_store: TokenStore,
        listener: Arc<dyn AuthCallbackListener>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            flow,
            token_store,
            listener,
            clock,
            current: Mutex::new(None),
        }
    }

    /// Resolve a usable token set, persisting any newly obtained tokens.
    ///
    /// # Errors
    ///
    /// Fails if the interactive authorization fails or the token file cannot
    /// be written. A corrupted or under-scoped token file is not an error; it
    /// triggers a fresh authorization.
    #[instrument(skip(self))]
    pub async fn obtain_tokens(&self) -> Result<OAuthTokens> {
        let mut current = self.current.lock().await;

        let stored = match self.token_store.load().await {
            Ok(tokens) => tokens,
            Err(AuthError::TokenCorrupted { path, reason }) => {
                warn!(path = %path, reason = %reason, "Ignoring corrupted token file");
                None
            }
            Err(e) => return Err(e),
        };

        let stored = stored.filter(|tokens| {
            let covered = tokens.covers_scopes(self.flow.scopes());
            if !covered {
                info!("Stored token does not cover the requested scopes, re-authorizing");
            }
            covered
        });

        let tokens = match stored {
            Some(tokens) if !self.needs_refresh(&tokens) => {
                debug!("Stored token is valid, no refresh needed");
                tokens
            }
            Some(tokens) if tokens.can_refresh() => match self.refresh(&tokens).await {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    warn!(error = %e, "Stored token could not be refreshed, re-authorizing");
                    self.authorize().await?
                }
            },
            _ => self.authorize().await?,
        };

        *current = Some(tokens.clone());
        Ok(tokens)
    }

    /// Run the interactive consent flow and persist the result.
    async fn authorize(&self) -> Result<OAuthTokens> {
        let (auth_url, verifier) = self.flow.build_auth_url()?;

        let response = self
            .listener
            .wait_for_authorization(&auth_url)
            .await
            .map_err(|e| AuthError::AuthorizationFailed(e.to_string()))?;

        let tokens = match timeout(
            DEFAULT_AUTH_TIMEOUT,
            self.flow
                .exchange_code(&response.code, &response.state, &verifier),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                error!("Token exchange timed out");
                return Err(AuthError::OperationTimeout {
                    operation: "token exchange".to_string(),
                });
            }
        };

        self.token_store.save(&tokens).await?;
        info!("Authorization completed");
        Ok(tokens)
    }

    /// Refresh the access token and persist the result.
    async fn refresh(&self, tokens: &OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        info!("Token expired or expiring soon, refreshing");

        let refreshed = match timeout(
            DEFAULT_AUTH_TIMEOUT,
            self.flow.refresh_access_token(refresh_token),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                error!("Token refresh timed out");
                return Err(AuthError::OperationTimeout {
                    operation: "token refresh".to_string(),
                });
            }
        };

        self.token_store.save(&refreshed).await?;
        Ok(refreshed)
    }

    fn needs_refresh(&self, tokens: &OAuthTokens) -> bool {
        tokens.is_expired_at(self.clock.now(), TOKEN_REFRESH_BUFFER.as_secs() as i64)
    }

    /// Return a valid access token, refreshing if needed.
    #[instrument(skip(self))]
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;

        let tokens = current.as_ref().ok_or_else(|| {
            warn!("Access token requested before credentials were obtained");
            AuthError::NotAuthenticated
        })?;

        if !self.needs_refresh(tokens) {
            return Ok(tokens.access_token.clone());
        }

        let refreshed = self.refresh(tokens).await.map_err(|e| {
            error!("Token refresh failed: {}", e);
            e
        })?;
        let access_token = refreshed.access_token.clone();
        *current = Some(refreshed);

        info!("Token refreshed successfully");
        Ok(access_token)
    }
}

#[async_trait]
impl AccessTokenSource for CredentialManager {
    async fn access_token(&self) -> BridgeResult<String> {
        Ok(self.get_valid_token().await?)
    }
}
