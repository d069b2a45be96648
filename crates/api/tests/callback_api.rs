//! Integration tests for the worker callback endpoints and the polling
//! queries that observe their effects.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, post_raw, OWNER};
use fileguard_core::task::TaskStatus;
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: progress callback is visible to polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_callback_updates_polled_progress() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", OWNER);

    let response = post_json(
        &t.app,
        "/api/v1/callback/progress",
        json!({ "taskId": "t1", "percent": 40, "phase": "running" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "received": true }));

    let response = get(&t.app, "/api/v1/files/progress/t1", Some(OWNER)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "taskId": "t1", "progress": 40 })
    );

    let record = t.state.registry.get("t1").unwrap();
    assert_eq!(record.phase.as_deref(), Some("running"));
}

// ---------------------------------------------------------------------------
// Test: last progress value wins, clamped into range
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_sequence_keeps_last_clamped_value() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", OWNER);

    for percent in [30, 80, 250] {
        post_json(
            &t.app,
            "/api/v1/callback/progress",
            json!({ "taskId": "t1", "percent": percent, "phase": "running" }),
        )
        .await;
    }
    assert_eq!(t.state.registry.get("t1").unwrap().progress, 100);

    post_json(
        &t.app,
        "/api/v1/callback/progress",
        json!({ "taskId": "t1", "percent": -5 }),
    )
    .await;
    assert_eq!(t.state.registry.get("t1").unwrap().progress, 0);
}

#[tokio::test]
async fn fractional_and_huge_percent_values_are_clamped() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", OWNER);

    for (raw, expected) in [
        (r#"{"taskId":"t1","percent":99999999999999999999}"#, 100),
        (r#"{"taskId":"t1","percent":-1e30}"#, 0),
        (r#"{"taskId":"t1","percent":150.5}"#, 100),
        (r#"{"taskId":"t1","percent":12.6}"#, 13),
    ] {
        let response = post_raw(&t.app, "/api/v1/callback/progress", raw.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK, "payload {raw}");

        let response = get(&t.app, "/api/v1/files/progress/t1", Some(OWNER)).await;
        assert_eq!(
            body_json(response).await,
            json!({ "taskId": "t1", "progress": expected }),
            "payload {raw}"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: finished callback completes the task
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finished_callback_reports_completion() {
    let t = build_test_app();
    t.submit_task("t1", "photo.png", OWNER);

    let response = post_json(
        &t.app,
        "/api/v1/callback/finished",
        json!({ "taskId": "t1", "artifactRef": "https://host/out.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&t.app, "/api/v1/files/completion-status/t1", Some(OWNER)).await;
    let json = body_json(response).await;
    assert_eq!(json["taskId"], "t1");
    assert_eq!(json["isCompleted"], true);
    assert_eq!(json["downloadUrl"], "https://host/out.png");
    assert_eq!(json["progress"], 100);

    t.drain_notifications().await;
    let stored = t.directory.notifications();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, TaskStatus::Success);
    assert_eq!(stored[0].message, "File protection completed.");
    assert_eq!(stored[0].file_name, "photo.png");

    let pushed = t.push.sent();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].token, "owner-phone");
    assert_eq!(pushed[0].task_id, "t1");
}

// ---------------------------------------------------------------------------
// Test: failed task is excluded from the in-progress view
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_callback_moves_task_out_of_uploading() {
    let t = build_test_app();
    t.submit_task("t2", "clip.mp4", OWNER);
    t.submit_task("t3", "voice.wav", OWNER);

    post_json(
        &t.app,
        "/api/v1/callback/failed",
        json!({ "taskId": "t2", "reason": "oom" }),
    )
    .await;

    let response = get(&t.app, "/api/v1/files/uploads", Some(OWNER)).await;
    let all = body_json(response).await;
    let t2 = all["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["taskId"] == "t2")
        .unwrap()
        .clone();
    assert_eq!(t2["status"], "fail");

    let response = get(&t.app, "/api/v1/files/uploads?status=uploading", Some(OWNER)).await;
    let in_progress = body_json(response).await;
    let ids: Vec<&str> = in_progress["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["taskId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["t3"]);

    let response = get(&t.app, "/api/v1/files/completion-status/t2", Some(OWNER)).await;
    let json = body_json(response).await;
    assert_eq!(json["isCompleted"], false);
    assert_eq!(json["downloadUrl"], "");

    t.drain_notifications().await;
    let stored = t.directory.notifications();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message, "Protection failed: oom");
}

// ---------------------------------------------------------------------------
// Test: callbacks after a terminal one change nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_terminal_callbacks_are_idempotent() {
    let t = build_test_app();
    t.submit_task("t1", "photo.png", OWNER);

    post_json(
        &t.app,
        "/api/v1/callback/finished",
        json!({ "taskId": "t1", "artifactRef": "https://host/first.png" }),
    )
    .await;
    let before = t.state.registry.get("t1").unwrap();

    let redelivered = [
        (
            "/api/v1/callback/finished",
            json!({ "taskId": "t1", "artifactRef": "https://host/second.png" }),
        ),
        (
            "/api/v1/callback/failed",
            json!({ "taskId": "t1", "reason": "late" }),
        ),
        (
            "/api/v1/callback/progress",
            json!({ "taskId": "t1", "percent": 10 }),
        ),
    ];
    for (uri, body) in redelivered {
        let response = post_json(&t.app, uri, body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let after = t.state.registry.get("t1").unwrap();
    assert_eq!(after, before);
    assert_eq!(
        t.state.downloads.artifact_ref("t1").as_deref(),
        Some("https://host/first.png")
    );

    t.drain_notifications().await;
    assert_eq!(t.directory.notifications().len(), 1);
    assert_eq!(t.push.sent().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: callbacks for unknown tasks are acknowledged and ignored
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_task_callbacks_are_noops() {
    let t = build_test_app();

    for (uri, body) in [
        (
            "/api/v1/callback/progress",
            json!({ "taskId": "ghost", "percent": 50 }),
        ),
        (
            "/api/v1/callback/finished",
            json!({ "taskId": "ghost", "artifactRef": "https://host/x.png" }),
        ),
        (
            "/api/v1/callback/failed",
            json!({ "taskId": "ghost", "reason": "oom" }),
        ),
    ] {
        let response = post_json(&t.app, uri, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["received"], true);
    }

    assert!(t.state.registry.is_empty());
    assert!(!t.state.downloads.is_completed("ghost"));
    t.drain_notifications().await;
    assert!(t.directory.notifications().is_empty());
}

// ---------------------------------------------------------------------------
// Test: malformed callbacks are rejected without side effects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_without_task_id_is_a_validation_error() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", OWNER);

    let response = post_json(&t.app, "/api/v1/callback/progress", json!({ "percent": 40 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        &t.app,
        "/api/v1/callback/finished",
        json!({ "taskId": "", "artifactRef": "https://host/x.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_matches!(
        t.state.registry.get("t1"),
        Some(record) if record.status == TaskStatus::Uploading && record.progress == 0
    );
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let t = build_test_app();

    let response = post_raw(&t.app, "/api/v1/callback/failed", "{not json".to_string()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: callbacks need no token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callbacks_are_not_authenticated() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", OWNER);

    let response = post_json(
        &t.app,
        "/api/v1/callback/progress",
        json!({ "taskId": "t1", "percent": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
