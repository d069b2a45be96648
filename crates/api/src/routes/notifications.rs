//! Route definitions for the `/notifications` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /mine        -> list_mine
/// DELETE /mine/{id}   -> delete_mine
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(notifications::list_mine))
        .route("/mine/{id}", delete(notifications::delete_mine))
}
