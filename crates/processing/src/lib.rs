//! Outbound gateway to the external processing worker.
//!
//! The worker receives the source file and a task id, and later reports
//! back through the callback endpoints using the same task id.

pub mod client;

pub use client::{HttpProcessingClient, ProcessingClient, ProcessingError};
