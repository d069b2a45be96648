//! Event names emitted on a task's progress stream.
//!
//! Used by the api crate when converting broadcaster events into
//! server-sent events.

/// First event on every stream, sent when the subscription is registered.
pub const EVENT_START: &str = "start";

/// Progress percentage update.
pub const EVENT_PROGRESS: &str = "progress";

/// Free-form phase label reported by the worker alongside a progress update.
pub const EVENT_PHASE: &str = "phase";

/// Terminal outcome; the stream closes after this event.
pub const EVENT_FINISH: &str = "finish";

/// Payload of the `start` event.
pub const START_MESSAGE: &str = "Progress stream started";
