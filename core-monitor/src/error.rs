use std::fmt;
use thiserror::Error;

/// Failures the monitor reports without ever aborting a cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Provider call {operation} failed: {message}")]
    ProviderCallFailure { operation: String, message: String },

    #[error("No permissions found for file {file_id}")]
    NoPermissionsFound { file_id: String },
}

impl MonitorError {
    pub fn provider(operation: &str, error: impl fmt::Display) -> Self {
        MonitorError::ProviderCallFailure {
            operation: operation.to_string(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
