//! Route definitions for the `/files` resource.
//!
//! All endpoints require authentication.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Uploads are capped at 512 MiB.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Routes mounted at `/files`.
///
/// ```text
/// POST   /upload                        -> upload
/// GET    /uploads                       -> list_uploads
/// GET    /uploads/{task_id}             -> get_upload
/// DELETE /uploads/{task_id}             -> delete_upload
/// GET    /progress/{task_id}            -> progress
/// GET    /completion-status/{task_id}   -> completion_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(files::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/uploads", get(files::list_uploads))
        .route(
            "/uploads/{task_id}",
            get(files::get_upload).delete(files::delete_upload),
        )
        .route("/progress/{task_id}", get(files::progress))
        .route(
            "/completion-status/{task_id}",
            get(files::completion_status),
        )
}
