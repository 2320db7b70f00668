//! Job poller - waits for an asynchronous backend job to finish
//!
//! Checks `job_status/{id}` on a fixed interval until the job reports
//! `completed` or `error`. There is no backoff and no attempt limit;
//! dropping the returned future stops the timer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::SubmitError;
use crate::backend::{BackendClient, JobState, job_status};

/// Default interval between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Polls job status for the submission pipeline
#[derive(Clone)]
pub struct JobPoller {
    backend: Arc<dyn BackendClient>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn BackendClient>, interval: Duration) -> Self {
        debug!(interval_ms = interval.as_millis() as u64, "JobPoller::new: called");
        Self { backend, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for `job_id` to reach a terminal status
    ///
    /// `Ok` carries the `result` payload of a completed job. `Err` carries
    /// the diagnostic for an errored job or a failed status check.
    pub async fn poll(&self, job_id: &str) -> Result<Value, SubmitError> {
        info!(%job_id, "poll: started");
        // First check fires one interval after start, like a plain repeating timer
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempt: u32 = 0;
        loop {
            ticker.tick().await;
            attempt += 1;

            let status = match job_status(self.backend.as_ref(), job_id).await {
                Ok(s) => s,
                Err(e) => {
                    warn!(%job_id, attempt, error = %e, "poll: status check failed");
                    return Err(e.into());
                }
            };

            if !status.status.is_terminal() {
                debug!(%job_id, attempt, status = ?status.status, "poll: still running");
                continue;
            }

            if status.status == JobState::Completed {
                info!(%job_id, attempt, "poll: job completed");
                return Ok(status.result);
            }
            let reason = status.result_text();
            warn!(%job_id, attempt, %reason, "poll: job reported error");
            return Err(SubmitError::JobFailed {
                job_id: job_id.to_string(),
                reason,
            });
        }
    }
}
