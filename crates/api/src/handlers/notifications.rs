//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fileguard_core::error::CoreError;
use fileguard_core::types::DbId;
use fileguard_db::models::notification::Notification;
use fileguard_db::repositories::NotificationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/notifications/mine
///
/// The caller's notifications, newest first.
pub async fn list_mine(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let user_id = auth.user_id(&state.pool).await?;
    let notifications = NotificationRepo::list_for_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// DELETE /api/v1/notifications/mine/{id}
///
/// Returns 404 if the notification does not belong to the caller.
pub async fn delete_mine(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user_id = auth.user_id(&state.pool).await?;
    let deleted = NotificationRepo::delete_for_user(&state.pool, user_id, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: id.to_string(),
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
