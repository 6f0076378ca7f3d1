//! # Host Bridge Traits
//!
//! Capability traits that decouple the monitor from the host it runs on.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the concrete
//! adapters shipped in `bridge-desktop` and `provider-google-drive`. Each trait
//! represents a capability that the core requires but does not implement
//! itself.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with TLS and transport retry
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Reading and writing the token artifact
//!
//! ### Cloud Storage
//! - [`DriveClient`](drive::DriveClient) - File listing and permission management
//!
//! ### Authentication
//! - [`AccessTokenSource`](auth::AccessTokenSource) - Ready-to-use bearer tokens
//! - [`AuthCallbackListener`](auth::AuthCallbackListener) - OAuth redirect capture
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! should convert their own errors into `BridgeError` with actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` across async tasks.

pub mod auth;
pub mod drive;
pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use auth::{AccessTokenSource, AuthCallbackListener, AuthorizationResponse};
pub use drive::{AccountIdentity, DriveClient, FilePermissions, FileRef, GranteeType, PermissionEntry};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::FileSystemAccess;
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
