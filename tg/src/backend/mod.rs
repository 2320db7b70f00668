//! Backend module for TripGuide
//!
//! HTTP seam to the trip-planning service: password check, free-form
//! queries, guided-question endpoints and job status polling.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;
mod types;

pub use client::{BackendClient, job_status, query, validate_password};
pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{HistoryEntry, JobState, JobStatus, PasswordCheck, QueryAnswer};

use crate::config::BackendConfig;

/// Create the HTTP backend client described by config
pub fn create_client(config: &BackendConfig) -> Result<Arc<dyn BackendClient>, BackendError> {
    debug!(base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(HttpBackend::from_config(config)?))
}
