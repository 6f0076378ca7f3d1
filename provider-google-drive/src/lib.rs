//! # Google Drive Provider
//!
//! Implements the `DriveClient` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - File listing by creation time, optionally within one folder
//! - Permission inspection and deletion
//! - Account identity and root permission lookup
//! - Mapping of API failures to typed errors

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{created_after_query, GoogleDriveConnector};
pub use error::{GoogleDriveError, Result};
