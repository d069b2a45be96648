//! Handlers for the `/files` resource: submission, listing, polling and
//! deletion of processing tasks.
//!
//! All endpoints require authentication via [`AuthUser`]. The
//! authenticated email is recorded as the task owner.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fileguard_core::error::CoreError;
use fileguard_core::task::{detect_file_type, FileType, TaskStatus};
use fileguard_core::types::Timestamp;
use fileguard_tracker::{TaskFilter, TaskMetadata, TaskRecord};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage;

/// Failure reason recorded when the worker rejects or cannot receive a
/// submission.
pub const WORKER_UNAVAILABLE: &str = "worker unavailable";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Client view of a task.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub task_id: String,
    pub file_name: String,
    pub file_type: &'static str,
    pub status: &'static str,
    pub progress: u8,
    pub phase: Option<String>,
    pub created_at: Timestamp,
    pub download_url: Option<String>,
}

impl From<TaskRecord> for TaskView {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.task_id,
            file_name: record.file_name,
            file_type: record.file_type.as_str(),
            status: record.status.as_str(),
            progress: record.progress,
            phase: record.phase,
            created_at: record.created_at,
            download_url: record.artifact_ref,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub task_id: String,
    pub progress: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionView {
    pub task_id: String,
    pub progress: u8,
    pub is_completed: bool,
    /// Empty until the task has completed successfully.
    pub download_url: String,
}

/// Query parameters for `GET /files/uploads`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/files/upload
///
/// Multipart fields: `file` (required), `type` (optional file type label;
/// detected from the extension when absent or unrecognised).
///
/// The task is registered before the worker is contacted. If the worker
/// cannot take the job the task is failed immediately and still returned
/// with 201, so the client sees it in its list.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<TaskView>)> {
    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut type_hint: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((file_name, data.to_vec()));
            }
            "type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                type_hint = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let file_type = resolve_file_type(&file_name, type_hint.as_deref());

    let task_id = uuid::Uuid::new_v4().to_string();
    let path = storage::source_path(&state.config.upload_dir, &auth.email, &task_id, &file_name);
    storage::save_upload(&path, &data).await?;

    let record = state.registry.submit(
        task_id.clone(),
        TaskMetadata {
            file_name,
            file_type,
            owner: auth.email.clone(),
        },
    )?;
    tracing::info!(task_id = %task_id, owner = %auth.email, file_type = %file_type, "Task submitted");

    if let Err(e) = state.processing.submit(&task_id, &path, file_type).await {
        tracing::warn!(task_id = %task_id, error = %e, "Worker submission failed");
        state
            .gateway
            .on_failed(&task_id, Some(WORKER_UNAVAILABLE))
            .await;
    }

    let current = state.registry.get(&task_id).unwrap_or(record);
    Ok((StatusCode::CREATED, Json(current.into())))
}

/// Look up a task the caller owns: 404 when unknown, 403 when it belongs to
/// someone else.
fn owned_task(state: &AppState, task_id: &str, auth: &AuthUser) -> AppResult<TaskRecord> {
    let record = state
        .registry
        .get(task_id)
        .ok_or_else(|| task_not_found(task_id))?;
    if record.owner != auth.email {
        return Err(AppError::Core(CoreError::Forbidden(
            "Task belongs to another user".into(),
        )));
    }
    Ok(record)
}

fn task_not_found(task_id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Task",
        id: task_id.to_string(),
    })
}

/// An explicit, recognised `type` wins over the extension.
fn resolve_file_type(file_name: &str, hint: Option<&str>) -> FileType {
    hint.and_then(|h| h.trim().parse::<FileType>().ok())
        .filter(|t| *t != FileType::Unknown)
        .unwrap_or_else(|| detect_file_type(file_name))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/files/uploads?status=&type=
///
/// The caller's tasks, newest first.
pub async fn list_uploads(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UploadQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskView>>>> {
    let filter = TaskFilter {
        owner: Some(auth.email),
        status: params
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?,
        file_type: params
            .file_type
            .as_deref()
            .map(str::parse::<FileType>)
            .transpose()?,
    };

    let mut records = state.registry.list(&filter);
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(DataResponse {
        data: records.into_iter().map(TaskView::from).collect(),
    }))
}

/// GET /api/v1/files/progress/{task_id}
///
/// Unknown tasks report progress 0.
pub async fn progress(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<ProgressView> {
    let progress = state.registry.get(&task_id).map_or(0, |r| r.progress);
    Json(ProgressView { task_id, progress })
}

/// GET /api/v1/files/uploads/{task_id}
///
/// One of the caller's tasks.
pub async fn get_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskView>> {
    let record = owned_task(&state, &task_id, &auth)?;
    Ok(Json(record.into()))
}

/// GET /api/v1/files/completion-status/{task_id}
pub async fn completion_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<CompletionView> {
    let progress = state.registry.get(&task_id).map_or(0, |r| r.progress);
    let download_url = state.downloads.artifact_ref(&task_id);

    Json(CompletionView {
        is_completed: download_url.is_some(),
        download_url: download_url.unwrap_or_default(),
        progress,
        task_id,
    })
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// DELETE /api/v1/files/uploads/{task_id}
///
/// Drops all local state for the task and asks the worker to stop. The
/// worker's answer is not awaited.
pub async fn delete_upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<StatusCode> {
    owned_task(&state, &task_id, &auth)?;
    // A concurrent delete may have won the race.
    let record = state
        .gateway
        .discard(&task_id)
        .await
        .ok_or_else(|| task_not_found(&task_id))?;

    let path = storage::source_path(
        &state.config.upload_dir,
        &record.owner,
        &task_id,
        &record.file_name,
    );
    if let Err(e) = storage::delete_upload(&path).await {
        tracing::warn!(task_id = %task_id, error = %e, "Failed to delete source file");
    }

    let processing = Arc::clone(&state.processing);
    let cancel_id = task_id.clone();
    tokio::spawn(async move {
        if let Err(e) = processing.cancel(&cancel_id).await {
            tracing::warn!(task_id = %cancel_id, error = %e, "Worker cancellation failed");
        }
    });

    tracing::info!(task_id = %task_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
