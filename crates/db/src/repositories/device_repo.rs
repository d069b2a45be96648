//! Repository for the `devices` table.

use sqlx::PgPool;
use fileguard_core::types::DbId;

use crate::models::device::Device;

const COLUMNS: &str = "id, user_id, push_token, created_at";

/// Push token registration for a user's devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Register a push token for a user.
    ///
    /// Returns `None` when the token is already registered; the existing row
    /// is left untouched.
    pub async fn register(
        pool: &PgPool,
        user_id: DbId,
        push_token: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (user_id, push_token)
             VALUES ($1, $2)
             ON CONFLICT (push_token) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(user_id)
            .bind(push_token)
            .fetch_optional(pool)
            .await
    }

    /// Remove a user's device by token. Returns `true` if a row was deleted.
    pub async fn delete_by_token(
        pool: &PgPool,
        user_id: DbId,
        push_token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE user_id = $1 AND push_token = $2")
            .bind(user_id)
            .bind(push_token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's registered devices, oldest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Device>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
