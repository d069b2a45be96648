//! HTTP error mapping.
//!
//! Every handler returns [`AppResult`]; the error side renders as
//! `{"error": <message>, "code": <CODE>}`. Server-side failures are logged
//! here and reach the client only as a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fileguard_core::error::CoreError;
use serde_json::json;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Repository failure. Inserts resolve conflicts in SQL, so nothing here
    /// is a client error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed multipart upload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Writing the uploaded source file failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<fileguard_tracker::RegistryError> for AppError {
    fn from(err: fileguard_tracker::RegistryError) -> Self {
        AppError::Core(err.into())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Core(CoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Core(CoreError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Core(CoreError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Core(CoreError::Unauthorized(_)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AppError::Core(CoreError::Forbidden(_)) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Database(_) | AppError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            AppError::Core(
                CoreError::Validation(msg)
                | CoreError::Conflict(msg)
                | CoreError::Unauthorized(msg)
                | CoreError::Forbidden(msg),
            )
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(_) | AppError::Storage(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": self.client_message(),
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}
