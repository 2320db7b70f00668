//! BackendClient trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{BackendError, HistoryEntry, JobStatus, PasswordCheck, QueryAnswer};

/// Request/response transport to the trip-planning backend
///
/// Implementations only move JSON; routing decisions (job endpoints,
/// response parsing) live in the submission pipeline.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// POST a JSON body to a backend path and return the decoded JSON response
    async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError>;

    /// GET a backend path and return the decoded JSON response
    async fn get(&self, path: &str) -> Result<Value, BackendError>;
}

/// Check a password against `POST /validate_password`
pub async fn validate_password(client: &dyn BackendClient, password: &str) -> Result<PasswordCheck, BackendError> {
    debug!("validate_password: called");
    let value = client
        .post("/validate_password", serde_json::json!({ "password": password }))
        .await?;
    Ok(serde_json::from_value(value)?)
}

/// Free-form question outside the guided flow (`POST /query`)
pub async fn query(client: &dyn BackendClient, text: &str, history: &[HistoryEntry]) -> Result<String, BackendError> {
    debug!(text_len = text.len(), history_len = history.len(), "query: called");
    let value = client
        .post("/query", serde_json::json!({ "query": text, "history": history }))
        .await?;
    let answer: QueryAnswer = serde_json::from_value(value)?;
    answer
        .answer
        .ok_or_else(|| BackendError::InvalidResponse("query response has no answer".to_string()))
}

/// Fetch the status of an asynchronous job (`GET /job_status/{job_id}`)
pub async fn job_status(client: &dyn BackendClient, job_id: &str) -> Result<JobStatus, BackendError> {
    debug!(%job_id, "job_status: called");
    let value = client.get(&format!("/job_status/{}", job_id)).await?;
    serde_json::from_value(value).map_err(|e| BackendError::InvalidResponse(format!("bad job status: {}", e)))
}

pub mod mock {
    //! Scripted backend for tests
    //!
    //! Responses are keyed by path and consumed in order; every call is recorded.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// A recorded backend call
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: &'static str,
        pub path: String,
        pub body: Option<Value>,
    }

    /// Backend returning queued responses per path
    #[derive(Default)]
    pub struct MockBackend {
        responses: Mutex<HashMap<String, VecDeque<Result<Value, String>>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            debug!("MockBackend::new: called");
            Self::default()
        }

        /// Queue a successful response for a path
        pub fn respond(self, path: &str, value: Value) -> Self {
            self.push(path, Ok(value));
            self
        }

        /// Queue a failed call for a path
        pub fn fail(self, path: &str, message: &str) -> Self {
            self.push(path, Err(message.to_string()));
            self
        }

        fn push(&self, path: &str, response: Result<Value, String>) {
            if let Ok(mut responses) = self.responses.lock() {
                responses.entry(path.to_string()).or_default().push_back(response);
            }
        }

        /// All calls made so far, in order
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        /// Number of calls made to one path
        pub fn call_count(&self, path: &str) -> usize {
            self.calls().iter().filter(|c| c.path == path).count()
        }

        fn next(&self, method: &'static str, path: &str, body: Option<Value>) -> Result<Value, BackendError> {
            debug!(%method, %path, "MockBackend::next: called");
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(RecordedCall {
                    method,
                    path: path.to_string(),
                    body,
                });
            }
            let next = self
                .responses
                .lock()
                .ok()
                .and_then(|mut r| r.get_mut(path).and_then(|q| q.pop_front()));
            match next {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(BackendError::InvalidResponse(message)),
                None => Err(BackendError::Status {
                    status: 404,
                    message: format!("no mock response for {}", path),
                }),
            }
        }
    }

    #[async_trait]
    impl BackendClient for MockBackend {
        async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError> {
            self.next("POST", path, Some(body))
        }

        async fn get(&self, path: &str) -> Result<Value, BackendError> {
            self.next("GET", path, None)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::chat::Role;

        #[tokio::test]
        async fn test_mock_returns_responses_in_order() {
            let backend = MockBackend::new()
                .respond("/job_status/j1", serde_json::json!({"status": "pending"}))
                .respond("/job_status/j1", serde_json::json!({"status": "completed", "result": {"answer": "ok"}}));

            let first = job_status(&backend, "j1").await.unwrap();
            assert!(!first.status.is_terminal());
            let second = job_status(&backend, "j1").await.unwrap();
            assert!(second.status.is_terminal());

            assert_eq!(backend.call_count("/job_status/j1"), 2);
        }

        #[tokio::test]
        async fn test_mock_errors_when_exhausted() {
            let backend = MockBackend::new();
            let result = backend.get("/anything").await;
            assert_eq!(result.unwrap_err().status(), Some(404));
        }

        #[tokio::test]
        async fn test_query_sends_history() {
            let backend = MockBackend::new().respond("/query", serde_json::json!({"answer": "Take I-5"}));
            let history = vec![HistoryEntry::new(Role::User, "Seattle to Portland?")];

            let answer = query(&backend, "Fastest road?", &history).await.unwrap();
            assert_eq!(answer, "Take I-5");

            let calls = backend.calls();
            let body = calls[0].body.as_ref().unwrap();
            assert_eq!(body["query"], "Fastest road?");
            assert_eq!(body["history"][0]["role"], "user");
        }

        #[tokio::test]
        async fn test_query_without_answer_is_invalid() {
            let backend = MockBackend::new().respond("/query", serde_json::json!({"message": "hm"}));
            let result = query(&backend, "hi", &[]).await;
            assert!(matches!(result, Err(BackendError::InvalidResponse(_))));
        }

        #[tokio::test]
        async fn test_validate_password() {
            let backend = MockBackend::new()
                .respond("/validate_password", serde_json::json!({"success": false}))
                .respond("/validate_password", serde_json::json!({"success": true}));

            assert!(!validate_password(&backend, "nope").await.unwrap().success);
            assert!(validate_password(&backend, "secret").await.unwrap().success);
            assert_eq!(backend.calls()[1].body.as_ref().unwrap()["password"], "secret");
        }
    }
}
