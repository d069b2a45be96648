//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::User;

const COLUMNS: &str = "id, email, created_at";

/// Read-only access to users. Accounts are created by the identity service.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by email (the `sub` claim of an access token).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
