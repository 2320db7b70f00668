//! Submission pipeline and job poller
//!
//! The pipeline turns an answered question into a backend request. Job-style
//! endpoints answer with a job id; those are resolved by polling. A filled-in
//! trip form can also be planned in one shot.

use std::sync::Arc;
use std::time::Duration;

mod error;
mod poller;
mod submit;
mod trip;

pub use error::SubmitError;
pub use poller::{DEFAULT_POLL_INTERVAL, JobPoller};
pub use submit::{Dispatch, SubmissionPipeline};
pub use trip::{MAX_DRIVING_HOURS, PLAN_TRIP_ENDPOINT, RoutePreference, TripError, TripForm, TripOutcome, TripRequest};

use crate::backend::BackendClient;
use crate::config::BackendConfig;

impl SubmissionPipeline {
    /// Pipeline with the job endpoints and poll interval from config
    pub fn from_config(backend: Arc<dyn BackendClient>, config: &BackendConfig) -> Self {
        let interval = match config.poll_interval_ms {
            0 => DEFAULT_POLL_INTERVAL,
            ms => Duration::from_millis(ms),
        };
        let poller = JobPoller::new(backend.clone(), interval);
        Self::new(backend, config.job_endpoints.clone(), poller)
    }

    pub fn poll_interval(&self) -> Duration {
        self.poller().interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::mock::MockBackend;

    #[test]
    fn test_from_config() {
        let backend: Arc<dyn BackendClient> = Arc::new(MockBackend::new());
        let pipeline = SubmissionPipeline::from_config(backend.clone(), &BackendConfig::default());
        assert_eq!(pipeline.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert!(pipeline.is_job_endpoint("/utility_itinerary"));
        assert!(!pipeline.is_job_endpoint("/init"));

        let config = BackendConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            SubmissionPipeline::from_config(backend, &config).poll_interval(),
            DEFAULT_POLL_INTERVAL
        );
    }
}
