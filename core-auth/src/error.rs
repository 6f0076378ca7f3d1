use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid client secrets: {0}")]
    InvalidClientSecrets(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("OAuth state mismatch: expected {expected}, got {actual}")]
    StateMismatch { expected: String, actual: String },

    #[error("Invalid authorization code: {0}")]
    InvalidAuthCode(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token file {path} is corrupted: {reason}")]
    TokenCorrupted { path: String, reason: String },

    #[error("Token storage failed: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Operation timed out: {operation}")]
    OperationTimeout { operation: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for BridgeError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::NotAuthenticated | AuthError::NoRefreshToken => {
                BridgeError::NotAvailable(error.to_string())
            }
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
