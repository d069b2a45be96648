//! Repository tests against a real Postgres database (`#[sqlx::test]`
//! creates a fresh database per test and applies `./migrations`).

use fileguard_core::types::DbId;
use fileguard_db::models::notification::CreateNotification;
use fileguard_db::repositories::{DeviceRepo, NotificationRepo, UserRepo};
use sqlx::PgPool;

async fn insert_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn notification(user_id: DbId, task_id: &str) -> CreateNotification {
    CreateNotification {
        user_id,
        task_id: task_id.to_string(),
        status: "success".to_string(),
        file_name: "photo.png".to_string(),
        file_type: "image".to_string(),
        message: "File protection completed.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn find_by_email_returns_only_matching_user(pool: PgPool) {
    let id = insert_user(&pool, "owner@example.com").await;

    let user = UserRepo::find_by_email(&pool, "owner@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.id, id);
    assert!(UserRepo::find_by_email(&pool, "nobody@example.com")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn create_once_rejects_second_row_for_same_task(pool: PgPool) {
    let user_id = insert_user(&pool, "owner@example.com").await;

    let first = NotificationRepo::create_once(&pool, &notification(user_id, "t1"))
        .await
        .unwrap();
    assert!(first.is_some());

    let mut redelivered = notification(user_id, "t1");
    redelivered.status = "fail".to_string();
    let second = NotificationRepo::create_once(&pool, &redelivered)
        .await
        .unwrap();
    assert!(second.is_none());

    let stored = NotificationRepo::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, "success");
}

#[sqlx::test]
async fn list_for_user_is_newest_first_and_scoped(pool: PgPool) {
    let owner = insert_user(&pool, "owner@example.com").await;
    let other = insert_user(&pool, "other@example.com").await;

    for task_id in ["t1", "t2", "t3"] {
        NotificationRepo::create_once(&pool, &notification(owner, task_id))
            .await
            .unwrap();
    }
    NotificationRepo::create_once(&pool, &notification(other, "o1"))
        .await
        .unwrap();

    let stored = NotificationRepo::list_for_user(&pool, owner).await.unwrap();
    let ids: Vec<&str> = stored.iter().map(|n| n.task_id.as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2", "t1"]);
}

#[sqlx::test]
async fn delete_for_user_only_touches_own_rows(pool: PgPool) {
    let owner = insert_user(&pool, "owner@example.com").await;
    let other = insert_user(&pool, "other@example.com").await;
    let row = NotificationRepo::create_once(&pool, &notification(owner, "t1"))
        .await
        .unwrap()
        .unwrap();

    assert!(!NotificationRepo::delete_for_user(&pool, other, row.id)
        .await
        .unwrap());
    assert_eq!(
        NotificationRepo::list_for_user(&pool, owner).await.unwrap().len(),
        1
    );

    assert!(NotificationRepo::delete_for_user(&pool, owner, row.id)
        .await
        .unwrap());
    assert!(!NotificationRepo::delete_for_user(&pool, owner, row.id)
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn register_is_idempotent_per_token(pool: PgPool) {
    let user_id = insert_user(&pool, "owner@example.com").await;

    let first = DeviceRepo::register(&pool, user_id, "phone-token")
        .await
        .unwrap();
    assert!(first.is_some());
    let again = DeviceRepo::register(&pool, user_id, "phone-token")
        .await
        .unwrap();
    assert!(again.is_none());

    let devices = DeviceRepo::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].push_token, "phone-token");
}

#[sqlx::test]
async fn delete_by_token_requires_owner(pool: PgPool) {
    let owner = insert_user(&pool, "owner@example.com").await;
    let other = insert_user(&pool, "other@example.com").await;
    DeviceRepo::register(&pool, owner, "phone-token")
        .await
        .unwrap();

    assert!(!DeviceRepo::delete_by_token(&pool, other, "phone-token")
        .await
        .unwrap());
    assert!(DeviceRepo::delete_by_token(&pool, owner, "phone-token")
        .await
        .unwrap());
    assert!(DeviceRepo::list_for_user(&pool, owner)
        .await
        .unwrap()
        .is_empty());
}
