//! Push device entity model.

use serde::Serialize;
use sqlx::FromRow;
use fileguard_core::types::{DbId, Timestamp};

/// A row from the `devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub user_id: DbId,
    pub push_token: String,
    pub created_at: Timestamp,
}

