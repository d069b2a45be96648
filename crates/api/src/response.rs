//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Acknowledgement returned to the processing worker for every callback.
#[derive(Debug, Serialize)]
pub struct Received {
    pub received: bool,
}

impl Received {
    pub const ACK: Received = Received { received: true };
}
