//! Handlers for the `/devices` resource (push token registration).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use fileguard_core::error::CoreError;
use fileguard_db::repositories::DeviceRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DeviceTokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub registered: bool,
    pub already_registered: bool,
}

/// POST /api/v1/devices
///
/// Idempotent: registering a known token succeeds without changes.
pub async fn register(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<DeviceTokenRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let user_id = auth.user_id(&state.pool).await?;
    let created = DeviceRepo::register(&state.pool, user_id, &body.token).await?;

    if created.is_some() {
        tracing::info!(user_id, "Device registered");
    }
    Ok(Json(RegisterResponse {
        registered: true,
        already_registered: created.is_none(),
    }))
}

/// DELETE /api/v1/devices
pub async fn unregister(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<DeviceTokenRequest>,
) -> AppResult<StatusCode> {
    let user_id = auth.user_id(&state.pool).await?;
    let deleted = DeviceRepo::delete_by_token(&state.pool, user_id, &body.token).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Device",
            id: body.token,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
