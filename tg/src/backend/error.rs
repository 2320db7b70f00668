//! Backend error types

use thiserror::Error;

/// Errors that can occur while talking to the trip-planning backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackendError {
    /// Check if this error happened below the HTTP layer (connection, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }

    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
