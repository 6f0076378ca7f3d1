//! # Authentication Module
//!
//! OAuth 2.0 credential provider for the Drive account being monitored.
//!
//! ## Overview
//!
//! This crate implements the installed-application flow: it reads the client
//! secrets file, reuses or refreshes the persisted token, and falls back to an
//! interactive consent through a loopback redirect when no usable token
//! exists.
//!
//! ## Features
//!
//! - OAuth 2.0 authorization flow with PKCE support
//! - Automatic token refresh before expiration
//! - JSON token file persistence with scope checking
//! - [`AccessTokenSource`](bridge_traits::auth::AccessTokenSource) for API clients

pub mod client_secrets;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod token_store;
pub mod types;

pub use client_secrets::ClientSecrets;
pub use error::{AuthError, Result};
pub use manager::CredentialManager;
pub use oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
pub use token_store::TokenStore;
pub use types::OAuthTokens;
