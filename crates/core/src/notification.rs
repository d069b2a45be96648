//! Notification text for terminal task outcomes.

/// Title used for every push message.
pub const PUSH_TITLE: &str = "fileguard";

/// Message stored when processing completes.
pub const MESSAGE_SUCCESS: &str = "File protection completed.";

/// Prefix of the message stored when processing fails.
pub const MESSAGE_FAILED: &str = "Protection failed";

/// Build the failure message, appending the worker's reason when present.
pub fn failure_message(reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => format!("{MESSAGE_FAILED}: {reason}"),
        None => MESSAGE_FAILED.to_string(),
    }
}
