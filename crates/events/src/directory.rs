//! Owner lookup and notification persistence seams used by the dispatcher.
//!
//! The dispatcher only ever sees the opaque owner identity recorded at
//! submission time (an email). [`OwnerDirectory`] turns it into a user id
//! and device tokens; [`NotificationStore`] persists the notification at
//! most once per task.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fileguard_core::task::{FileType, TaskStatus};
use fileguard_core::types::DbId;
use fileguard_db::models::notification::CreateNotification;
use fileguard_db::repositories::{DeviceRepo, NotificationRepo, UserRepo};
use fileguard_db::DbPool;

/// Error from a directory or store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A resolved notification recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub user_id: DbId,
    pub device_tokens: Vec<String>,
}

/// A notification about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: DbId,
    pub task_id: String,
    pub status: TaskStatus,
    pub file_name: String,
    pub file_type: FileType,
    pub message: String,
}

#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    /// Resolve an owner identity. `None` when no such user exists.
    async fn resolve(&self, identity: &str) -> Result<Option<Owner>, StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist the notification unless one already exists for its task.
    /// Returns `false` when it was a duplicate.
    async fn create_once(&self, notification: &NewNotification) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// Directory and store backed by the `users`, `devices` and
/// `notifications` tables.
#[derive(Clone)]
pub struct PgDirectory {
    pool: DbPool,
}

impl PgDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerDirectory for PgDirectory {
    async fn resolve(&self, identity: &str) -> Result<Option<Owner>, StoreError> {
        let Some(user) = UserRepo::find_by_email(&self.pool, identity).await? else {
            return Ok(None);
        };
        let devices = DeviceRepo::list_for_user(&self.pool, user.id).await?;
        Ok(Some(Owner {
            user_id: user.id,
            device_tokens: devices.into_iter().map(|d| d.push_token).collect(),
        }))
    }
}

#[async_trait]
impl NotificationStore for PgDirectory {
    async fn create_once(&self, notification: &NewNotification) -> Result<bool, StoreError> {
        let input = CreateNotification {
            user_id: notification.user_id,
            task_id: notification.task_id.clone(),
            status: notification.status.as_str().to_string(),
            file_name: notification.file_name.clone(),
            file_type: notification.file_type.as_str().to_string(),
            message: notification.message.clone(),
        };
        let created = NotificationRepo::create_once(&self.pool, &input).await?;
        Ok(created.is_some())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// In-process directory and store, keyed by owner identity.
///
/// Used by tests and local runs without a database.
#[derive(Default)]
pub struct MemoryDirectory {
    owners: Mutex<HashMap<String, Owner>>,
    notifications: Mutex<Vec<NewNotification>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an owner.
    pub fn insert_owner(&self, identity: &str, user_id: DbId, device_tokens: &[&str]) {
        let owner = Owner {
            user_id,
            device_tokens: device_tokens.iter().map(|t| t.to_string()).collect(),
        };
        self.owners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identity.to_string(), owner);
    }

    /// Every notification stored so far, in insertion order.
    pub fn notifications(&self) -> Vec<NewNotification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl OwnerDirectory for MemoryDirectory {
    async fn resolve(&self, identity: &str) -> Result<Option<Owner>, StoreError> {
        Ok(self
            .owners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(identity)
            .cloned())
    }
}

#[async_trait]
impl NotificationStore for MemoryDirectory {
    async fn create_once(&self, notification: &NewNotification) -> Result<bool, StoreError> {
        let mut stored = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        if stored.iter().any(|n| n.task_id == notification.task_id) {
            return Ok(false);
        }
        stored.push(notification.clone());
        Ok(true)
    }
}
