//! HTTP client for the processing worker.
//!
//! [`HttpProcessingClient`] submits a job as `POST {base}/noise` (multipart:
//! `taskId`, `fileType`, `file`) and requests cancellation with
//! `POST {base}/cancel` (`{"taskId": ...}`).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use fileguard_core::task::FileType;
use reqwest::multipart::{Form, Part};

/// Errors from the processing worker gateway.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The worker returned a non-2xx status code.
    #[error("Worker API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The source file could not be read.
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

/// Submission and cancellation against the external worker.
#[async_trait]
pub trait ProcessingClient: Send + Sync {
    /// Hand a stored source file to the worker under `task_id`.
    async fn submit(
        &self,
        task_id: &str,
        source: &Path,
        file_type: FileType,
    ) -> Result<(), ProcessingError>;

    /// Ask the worker to stop processing `task_id`. Best-effort.
    async fn cancel(&self, task_id: &str) -> Result<(), ProcessingError>;
}

/// [`ProcessingClient`] over HTTP.
pub struct HttpProcessingClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProcessingClient {
    /// * `base_url` - Worker base URL, e.g. `http://localhost:5000`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProcessingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn submit_url(&self) -> String {
        format!("{}/noise", self.base_url)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.base_url)
    }

    /// Ensure the response has a success status code, capturing the body
    /// on failure.
    async fn check_status(response: reqwest::Response) -> Result<(), ProcessingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProcessingError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessingClient for HttpProcessingClient {
    async fn submit(
        &self,
        task_id: &str,
        source: &Path,
        file_type: FileType,
    ) -> Result<(), ProcessingError> {
        let bytes = tokio::fs::read(source).await?;
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| task_id.to_string());

        let form = Form::new()
            .text("taskId", task_id.to_string())
            .text("fileType", file_type.as_str())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(self.submit_url())
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::info!(task_id, file_type = %file_type, "Submitted task to worker");
        Ok(())
    }

    async fn cancel(&self, task_id: &str) -> Result<(), ProcessingError> {
        let response = self
            .client
            .post(self.cancel_url())
            .json(&serde_json::json!({ "taskId": task_id }))
            .send()
            .await?;
        Self::check_status(response).await
    }
}
