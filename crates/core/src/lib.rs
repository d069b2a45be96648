//! Domain primitives shared by every fileguard crate.
//!
//! Pure types, constants, and functions only. This crate has no internal
//! dependencies so that the tracker, events, processing and api crates can
//! all build on it.

pub mod error;
pub mod notification;
pub mod progress;
pub mod task;
pub mod task_events;
pub mod types;
