//! Handlers for the `/callback` resource.
//!
//! Called by the processing worker, not by end users, so these endpoints
//! carry no authentication. Every well-formed callback is acknowledged with
//! `{"received": true}`, including callbacks for unknown or already
//! finished tasks.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::response::Received;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCallback {
    #[serde(default)]
    #[validate(length(min = 1, message = "taskId is required"))]
    pub task_id: String,
    /// Raw percentage; rounded and clamped into `0..=100` by the registry.
    /// Any JSON number is accepted, including fractions and values far
    /// outside the range.
    #[serde(default)]
    pub percent: f64,
    pub phase: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FinishedCallback {
    #[serde(default)]
    #[validate(length(min = 1, message = "taskId is required"))]
    pub task_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "artifactRef is required"))]
    pub artifact_ref: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FailedCallback {
    #[serde(default)]
    #[validate(length(min = 1, message = "taskId is required"))]
    pub task_id: String,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/callback/progress
pub async fn progress(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ProgressCallback>,
) -> AppResult<Json<Received>> {
    state
        .gateway
        .on_progress(&body.task_id, body.percent, body.phase.as_deref())
        .await;
    Ok(Json(Received::ACK))
}

/// POST /api/v1/callback/finished
pub async fn finished(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<FinishedCallback>,
) -> AppResult<Json<Received>> {
    state
        .gateway
        .on_finished(&body.task_id, &body.artifact_ref)
        .await;
    Ok(Json(Received::ACK))
}

/// POST /api/v1/callback/failed
pub async fn failed(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<FailedCallback>,
) -> AppResult<Json<Received>> {
    state
        .gateway
        .on_failed(&body.task_id, body.reason.as_deref())
        .await;
    Ok(Json(Received::ACK))
}
