//! JSON body extractor that runs `validator` rules before the handler.

use axum::extract::{FromRequest, Request};
use axum::Json;
use fileguard_core::error::CoreError;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// Like [`Json`], but malformed bodies and failed validation both become a
/// 400 `VALIDATION_ERROR` instead of axum's default rejections.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| CoreError::Validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}
