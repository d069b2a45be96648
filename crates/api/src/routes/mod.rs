pub mod callback;
pub mod devices;
pub mod files;
pub mod health;
pub mod notifications;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree, minus the progress stream.
///
/// Route hierarchy:
///
/// ```text
/// /callback/progress                     worker progress report (public)
/// /callback/finished                     worker success report (public)
/// /callback/failed                       worker failure report (public)
///
/// /files/upload                          submit a file (POST)
/// /files/uploads                         list own tasks (?status=&type=)
/// /files/uploads/{task_id}               one own task (GET) / delete it (DELETE)
/// /files/progress/{task_id}              poll progress
/// /files/completion-status/{task_id}     poll completion
///
/// /notifications/mine                    list own notifications
/// /notifications/mine/{id}               delete a notification
///
/// /devices                               register / unregister a push token
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/callback", callback::router())
        .nest("/files", files::router())
        .nest("/notifications", notifications::router())
        .nest("/devices", devices::router())
}

/// Long-lived streaming routes, mounted outside the request timeout.
///
/// ```text
/// /api/v1/files/progress-stream/{task_id}   server-sent progress events
/// ```
pub fn stream_routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/files/progress-stream/{task_id}",
        get(handlers::stream::progress_stream),
    )
}
