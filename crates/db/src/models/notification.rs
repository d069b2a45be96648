//! Notification entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use fileguard_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
///
/// `status` and `file_type` hold the wire labels of
/// [`TaskStatus`](fileguard_core::task::TaskStatus) and
/// [`FileType`](fileguard_core::task::FileType).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: DbId,
    #[serde(skip)]
    pub user_id: DbId,
    pub task_id: String,
    pub status: String,
    pub file_name: String,
    pub file_type: String,
    pub message: String,
    pub created_at: Timestamp,
}

/// Insert DTO for a terminal-outcome notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub task_id: String,
    pub status: String,
    pub file_name: String,
    pub file_type: String,
    pub message: String,
}
