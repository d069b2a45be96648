//! In-memory task tracking.
//!
//! - [`TaskRegistry`] -- authoritative state of every submitted task.
//! - [`DownloadResolver`] -- artifact references of completed tasks.
//!
//! Both are keyed by task id on top of a sharded concurrent map, so
//! operations on unrelated tasks never contend on a process-wide lock.
//! State is volatile and discarded on restart.

pub mod downloads;
pub mod registry;

pub use downloads::DownloadResolver;
pub use registry::{
    ProgressUpdate, RegistryError, TaskFilter, TaskMetadata, TaskRecord, TaskRegistry, Transition,
};
