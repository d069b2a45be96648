//! Completion artifact lookup.
//!
//! [`DownloadResolver`] remembers where the output of a completed task can
//! be fetched. It is written once per task from the `finished` callback path
//! and read by the completion polling endpoint.

use dashmap::DashMap;
use fileguard_core::types::{TaskId, Timestamp};

/// A completed task's artifact reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub artifact_ref: String,
    pub completed_at: Timestamp,
}

/// Concurrent map of task id to completion artifact.
#[derive(Default)]
pub struct DownloadResolver {
    downloads: DashMap<TaskId, Download>,
}

impl DownloadResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the artifact for a task. The first writer wins; later calls
    /// for the same task are ignored and return `false`.
    pub fn record(&self, task_id: &str, artifact_ref: &str) -> bool {
        let mut inserted = false;
        self.downloads.entry(task_id.to_string()).or_insert_with(|| {
            inserted = true;
            Download {
                artifact_ref: artifact_ref.to_string(),
                completed_at: chrono::Utc::now(),
            }
        });

        if inserted {
            tracing::debug!(task_id, artifact_ref, "Recorded download artifact");
        }
        inserted
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.downloads.contains_key(task_id)
    }

    pub fn artifact_ref(&self, task_id: &str) -> Option<String> {
        self.downloads.get(task_id).map(|d| d.artifact_ref.clone())
    }

    pub fn get(&self, task_id: &str) -> Option<Download> {
        self.downloads.get(task_id).map(|d| d.clone())
    }

    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }

    /// Drop the artifact of a task the user deleted.
    pub fn forget(&self, task_id: &str) -> bool {
        self.downloads.remove(task_id).is_some()
    }
}
