//! Wire types exchanged with the backend

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::Role;

/// One prior conversation turn sent along with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Lifecycle of an asynchronous backend job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Completed,
    Error,
    /// Any status string this client does not know; treated as still running
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Completed and error are the only states that stop polling
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Error)
    }
}

/// Response of `GET /job_status/{job_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    #[serde(default)]
    pub result: Value,
}

impl JobStatus {
    /// Render the result payload as a diagnostic string (for error status)
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            Value::Null => "unknown error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Response of `POST /validate_password`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordCheck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /query`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryAnswer {
    #[serde(default)]
    pub answer: Option<String>,
}
