//! Repository for the `notifications` table.

use sqlx::PgPool;
use fileguard_core::types::DbId;

use crate::models::notification::{CreateNotification, Notification};

const COLUMNS: &str =
    "id, user_id, task_id, status, file_name, file_type, message, created_at";

/// Persisted terminal-outcome notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification unless one already exists for the task.
    ///
    /// Returns `None` when the `task_id` unique constraint rejected the row,
    /// which is how redelivered terminal callbacks are deduplicated.
    pub async fn create_once(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, task_id, status, file_name, file_type, message)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (task_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(&input.task_id)
            .bind(&input.status)
            .bind(&input.file_name)
            .bind(&input.file_type)
            .bind(&input.message)
            .fetch_optional(pool)
            .await
    }

    /// List a user's notifications, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Delete one of a user's notifications. Returns `true` if a row was
    /// deleted; rows owned by other users are never touched.
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
