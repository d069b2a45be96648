//! Mobile push delivery.
//!
//! [`FcmPushSender`] posts one message to the Firebase Cloud Messaging HTTP
//! v1 API per device token. Each send is a single attempt with a 10 s
//! timeout; failures are returned to the caller, which logs and moves on.
//! [`LogPushSender`] stands in when FCM is not configured.

use std::time::Duration;

use async_trait::async_trait;
use fileguard_core::task::TaskStatus;

/// HTTP request timeout for a single push attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/v1/projects";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push service returned a non-2xx status code.
    #[error("Push service returned HTTP {0}")]
    HttpStatus(u16),

    /// The device token is no longer registered with the push service.
    #[error("Device token is not registered")]
    Unregistered,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One push message addressed to a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub task_id: String,
    pub status: TaskStatus,
}

impl PushMessage {
    /// FCM HTTP v1 request body.
    pub fn to_fcm_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "message": {
                "token": self.token,
                "notification": {
                    "title": self.title,
                    "body": self.body,
                },
                "data": {
                    "taskId": self.task_id,
                    "status": self.status.as_str(),
                },
            }
        })
    }
}

/// A push delivery channel.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError>;
}

// ---------------------------------------------------------------------------
// FcmPushSender
// ---------------------------------------------------------------------------

/// Delivers push messages through Firebase Cloud Messaging.
pub struct FcmPushSender {
    client: reqwest::Client,
    url: String,
    access_token: String,
}

impl FcmPushSender {
    pub fn new(project_id: &str, access_token: impl Into<String>) -> Result<Self, PushError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: format!("{FCM_ENDPOINT}/{project_id}/messages:send"),
            access_token: access_token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&message.to_fcm_payload())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PushError::Unregistered);
        }
        if !status.is_success() {
            return Err(PushError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogPushSender
// ---------------------------------------------------------------------------

/// Logs push messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), PushError> {
        tracing::info!(
            task_id = %message.task_id,
            status = %message.status,
            body = %message.body,
            "Push delivery disabled, message logged"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
