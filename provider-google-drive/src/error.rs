//! Drive REST errors

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Failures of a single Drive API call.
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// 401, or no bearer token could be obtained
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Any other non-2xx status, with the message from the error envelope
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// 429; the caller decides when to try again
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// 404 for the addressed file or container
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::NotFound { resource } => BridgeError::NotFound(resource),
            GoogleDriveError::Bridge(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
