//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! the monitor needs on a desktop or server host:
//! - `HttpClient` using `reqwest`
//! - `FileSystemAccess` using `tokio::fs`
//! - `AuthCallbackListener` using a loopback `axum` server
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LoopbackCallbackListener, ReqwestHttpClient, TokioFileSystem};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let fs = TokioFileSystem::new().with_private_files(true);
//!     let callback = LoopbackCallbackListener::bind().await?;
//!     // Hand these to core-auth and provider-google-drive
//!     Ok(())
//! }
//! ```

mod filesystem;
mod http;
mod oauth_callback;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use oauth_callback::LoopbackCallbackListener;
