//! Route definitions for the `/devices` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// POST   /   -> register
/// DELETE /   -> unregister
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(devices::register).delete(devices::unregister))
}
