//! Route definitions for the `/callback` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::callback;
use crate::state::AppState;

/// Routes mounted at `/callback`.
///
/// ```text
/// POST   /progress   -> progress
/// POST   /finished   -> finished
/// POST   /failed     -> failed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress", post(callback::progress))
        .route("/finished", post(callback::finished))
        .route("/failed", post(callback::failed))
}
