//! Submission error types

use thiserror::Error;

use crate::backend::BackendError;

/// Errors from submitting a guided answer
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Job {job_id} failed: {reason}")]
    JobFailed { job_id: String, reason: String },

    #[error("Question '{0}' has no endpoint")]
    MissingEndpoint(String),
}

impl SubmitError {
    /// Backend reported the failure (as opposed to the transport)
    pub fn is_backend_reported(&self) -> bool {
        match self {
            SubmitError::JobFailed { .. } => true,
            SubmitError::Backend(e) => e.status().is_some(),
            SubmitError::MissingEndpoint(_) => false,
        }
    }
}
