//! reqwest-backed implementation of BackendClient

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::{BackendClient, BackendError};
use crate::config::BackendConfig;

/// HTTP client for the trip-planning backend
///
/// No retries here: a failed single-shot request surfaces to the flow
/// controller, which re-prompts the user.
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Create a new client from backend configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tripguide/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn decode(response: Response) -> Result<Value, BackendError> {
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "decode: backend error status");
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        debug!(body_len = text.len(), "decode: success");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError> {
        let url = self.url(path);
        debug!(%url, "post: called");
        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, BackendError> {
        let url = self.url(path);
        debug!(%url, "get: called");
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }
}
