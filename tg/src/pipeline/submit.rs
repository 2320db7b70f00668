//! Submission pipeline - turns an answer into a backend request

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::{JobPoller, SubmitError};
use crate::backend::{BackendClient, HistoryEntry};
use crate::flow::{Answers, ParsedAnswer, PayloadContext, Question};

/// Immediate outcome of dispatching a request
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The backend answered directly
    Answered(ParsedAnswer),
    /// The backend accepted a job that must be polled
    Job(String),
}

/// Builds, sends and resolves guided-question submissions
#[derive(Clone)]
pub struct SubmissionPipeline {
    backend: Arc<dyn BackendClient>,
    job_endpoints: Vec<String>,
    poller: JobPoller,
}

impl SubmissionPipeline {
    pub fn new(backend: Arc<dyn BackendClient>, job_endpoints: Vec<String>, poller: JobPoller) -> Self {
        debug!(?job_endpoints, "SubmissionPipeline::new: called");
        Self {
            backend,
            job_endpoints,
            poller,
        }
    }

    pub fn backend(&self) -> &Arc<dyn BackendClient> {
        &self.backend
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Endpoint answers with a job id rather than a final answer
    pub fn is_job_endpoint(&self, endpoint: &str) -> bool {
        self.job_endpoints.iter().any(|e| e == endpoint)
    }

    /// Submit an answer and wait for the parsed result
    ///
    /// Job-style endpoints are handed to the poller; the completed job's
    /// result is parsed with the question's response shape.
    pub async fn submit(
        &self,
        question: &Question,
        answers: &Answers,
        current_answer: &str,
        history: &[HistoryEntry],
    ) -> Result<ParsedAnswer, SubmitError> {
        debug!(question = %question.id, "submit: called");
        match self.dispatch(question, answers, current_answer, history).await? {
            Dispatch::Answered(parsed) => Ok(parsed),
            Dispatch::Job(job_id) => {
                info!(question = %question.id, %job_id, "submit: waiting on job");
                let result = self.poller.poll(&job_id).await?;
                Ok(question.response.parse(&result))
            }
        }
    }

    /// Send the request and classify the immediate response
    pub async fn dispatch(
        &self,
        question: &Question,
        answers: &Answers,
        current_answer: &str,
        history: &[HistoryEntry],
    ) -> Result<Dispatch, SubmitError> {
        let endpoint = question
            .endpoint
            .as_deref()
            .ok_or_else(|| SubmitError::MissingEndpoint(question.id.clone()))?;

        let ctx = PayloadContext {
            answers,
            current_answer,
            history,
        };
        let body = question.payload(&ctx);
        debug!(%endpoint, "dispatch: posting");
        let response = self.backend.post(endpoint, body).await?;

        if self.is_job_endpoint(endpoint) {
            if let Some(job_id) = job_id(&response) {
                debug!(%endpoint, %job_id, "dispatch: job accepted");
                return Ok(Dispatch::Job(job_id));
            }
            // e.g. an infeasible route is answered straight away
            debug!(%endpoint, "dispatch: job endpoint answered directly");
        }

        Ok(Dispatch::Answered(question.response.parse(&response)))
    }
}

pub(super) fn job_id(response: &Value) -> Option<String> {
    match response.get("job_id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::client::mock::MockBackend;

    fn pipeline(backend: MockBackend) -> (SubmissionPipeline, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let poller = JobPoller::new(backend.clone(), Duration::from_millis(1));
        let pipeline = SubmissionPipeline::new(backend.clone(), vec!["/plan".to_string()], poller);
        (pipeline, backend)
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let (pipeline, backend) =
            pipeline(MockBackend::new().respond("/check", serde_json::json!({"message": "Feasible", "continue": true})));
        let q = Question::api("hours", "Hours?", "/check");

        let parsed = pipeline.submit(&q, &Answers::new(), "6", &[]).await.unwrap();
        assert_eq!(parsed.answer, "Feasible");
        assert!(parsed.continue_flow);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body.as_ref().unwrap()["query"], "6");
    }

    #[tokio::test]
    async fn test_dispatch_job_does_not_poll() {
        let (pipeline, backend) = pipeline(MockBackend::new().respond("/plan", serde_json::json!({"job_id": "j9"})));
        let q = Question::api("hurry", "Hurry?", "/plan");

        let dispatch = pipeline.dispatch(&q, &Answers::new(), "No", &[]).await.unwrap();
        assert_eq!(dispatch, Dispatch::Job("j9".to_string()));
        assert_eq!(backend.call_count("/job_status/j9"), 0);
    }

    #[tokio::test]
    async fn test_job_endpoint_submit_resolves_result() {
        let (pipeline, backend) = pipeline(
            MockBackend::new()
                .respond("/plan", serde_json::json!({"job_id": "j1"}))
                .respond("/job_status/j1", serde_json::json!({"status": "pending"}))
                .respond(
                    "/job_status/j1",
                    serde_json::json!({"status": "completed", "result": {"answer": "Done"}}),
                ),
        );
        let q = Question::api("hurry", "Hurry?", "/plan");

        let parsed = pipeline.submit(&q, &Answers::new(), "No", &[]).await.unwrap();
        assert_eq!(parsed.answer, "Done");
        assert_eq!(backend.call_count("/job_status/j1"), 2);
    }

    #[tokio::test]
    async fn test_job_result_as_bare_string() {
        let (pipeline, _) = pipeline(
            MockBackend::new()
                .respond("/plan", serde_json::json!({"job_id": "j2"}))
                .respond(
                    "/job_status/j2",
                    serde_json::json!({"status": "completed", "result": "Day 1\n- Route: Seattle → Portland"}),
                ),
        );
        let q = Question::api("hurry", "Hurry?", "/plan");

        let parsed = pipeline.submit(&q, &Answers::new(), "No", &[]).await.unwrap();
        assert_eq!(parsed.answer, "Day 1\n- Route: Seattle → Portland");
        assert!(parsed.continue_flow);
    }

    #[tokio::test]
    async fn test_job_endpoint_without_job_id_is_direct() {
        let (pipeline, backend) = pipeline(MockBackend::new().respond(
            "/plan",
            serde_json::json!({"feasible": false, "answer": "Too far", "continue": false}),
        ));
        let q = Question::api("hurry", "Hurry?", "/plan");

        let parsed = pipeline.submit(&q, &Answers::new(), "Yes", &[]).await.unwrap();
        assert_eq!(parsed.answer, "Too far");
        assert!(!parsed.continue_flow);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_job_error_propagates() {
        let (pipeline, _) = pipeline(
            MockBackend::new()
                .respond("/plan", serde_json::json!({"job_id": 42}))
                .respond("/job_status/42", serde_json::json!({"status": "error", "result": "agent crashed"})),
        );
        let q = Question::api("hurry", "Hurry?", "/plan");

        let err = pipeline.submit(&q, &Answers::new(), "Yes", &[]).await.unwrap_err();
        assert!(matches!(err, SubmitError::JobFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let (pipeline, backend) = pipeline(MockBackend::new());
        let q = Question::collect("from", "From?");

        let err = pipeline.submit(&q, &Answers::new(), "Seattle", &[]).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingEndpoint(id) if id == "from"));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_job_id_extraction() {
        assert_eq!(job_id(&serde_json::json!({"job_id": "abc"})), Some("abc".to_string()));
        assert_eq!(job_id(&serde_json::json!({"job_id": 7})), Some("7".to_string()));
        assert_eq!(job_id(&serde_json::json!({"job_id": ""})), None);
        assert_eq!(job_id(&serde_json::json!({"answer": "x"})), None);
    }
}
