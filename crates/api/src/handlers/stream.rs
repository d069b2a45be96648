//! Server-sent progress stream for a single task.
//!
//! The stream starts with a `start` event, then relays `progress`, `phase`
//! and finally `finish`, after which it ends. A stream that sees no event
//! for the configured idle timeout is closed; the client then falls back to
//! polling.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use fileguard_core::task_events::{
    EVENT_FINISH, EVENT_PHASE, EVENT_PROGRESS, EVENT_START, START_MESSAGE,
};
use fileguard_events::{TaskEvent, TaskOutcome};
use futures::stream::{self, Stream};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/files/progress-stream/{task_id}
pub async fn progress_stream(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.broadcaster.subscribe(&task_id);
    let idle_timeout = state.config.stream_idle_timeout();
    tracing::debug!(task_id = %task_id, "Progress stream opened");

    let events = stream::unfold(subscription, move |mut subscription| async move {
        match tokio::time::timeout(idle_timeout, subscription.recv()).await {
            Ok(Some(event)) => Some((Ok(to_sse_event(event)), subscription)),
            Ok(None) => None,
            Err(_) => {
                tracing::debug!(task_id = subscription.task_id(), "Progress stream idle, closing");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Render a broadcaster event as a named SSE event.
pub fn to_sse_event(event: TaskEvent) -> Event {
    match event {
        TaskEvent::Start => Event::default().event(EVENT_START).data(START_MESSAGE),
        TaskEvent::Progress(percent) => Event::default()
            .event(EVENT_PROGRESS)
            .data(percent.to_string()),
        TaskEvent::Phase(phase) => Event::default().event(EVENT_PHASE).data(phase),
        TaskEvent::Finish(outcome) => Event::default()
            .event(EVENT_FINISH)
            .data(finish_payload(&outcome).to_string()),
    }
}

fn finish_payload(outcome: &TaskOutcome) -> serde_json::Value {
    match outcome {
        TaskOutcome::Success { artifact_ref } => serde_json::json!({
            "status": "success",
            "downloadUrl": artifact_ref,
        }),
        TaskOutcome::Failed { reason } => serde_json::json!({
            "status": "fail",
            "reason": reason,
        }),
    }
}
