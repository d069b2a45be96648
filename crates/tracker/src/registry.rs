//! Authoritative in-memory map of task state.
//!
//! Every mutation of a single task runs under that task's map entry lock,
//! so the check-then-write sequences below (duplicate detection, terminal
//! freezing) are atomic per task id. Entries for different task ids live in
//! different shards and do not block each other.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fileguard_core::error::CoreError;
use fileguard_core::progress::{clamp_percent, PROGRESS_MAX};
use fileguard_core::task::{FileType, TaskStatus};
use fileguard_core::types::{TaskId, Timestamp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Metadata recorded by the caller at submission time.
#[derive(Debug, Clone)]
pub struct TaskMetadata {
    pub file_name: String,
    pub file_type: FileType,
    /// Opaque reference to the owning user (an email address).
    pub owner: String,
}

/// Snapshot of a task's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub file_name: String,
    pub file_type: FileType,
    pub owner: String,
    pub status: TaskStatus,
    /// Always within `0..=100`.
    pub progress: u8,
    /// Last phase label reported by the worker.
    pub phase: Option<String>,
    pub created_at: Timestamp,
    /// Set once on success; frozen afterwards.
    pub artifact_ref: Option<String>,
    /// Set once on failure; frozen afterwards.
    pub failure_reason: Option<String>,
}

impl TaskRecord {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Optional filters for [`TaskRegistry::list`]. `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub owner: Option<String>,
    pub status: Option<TaskStatus>,
    pub file_type: Option<FileType>,
}

impl TaskFilter {
    fn matches(&self, record: &TaskRecord) -> bool {
        self.owner.as_deref().map_or(true, |o| o == record.owner)
            && self.status.map_or(true, |s| s == record.status)
            && self.file_type.map_or(true, |t| t == record.file_type)
    }
}

/// Result of [`TaskRegistry::update_progress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// The clamped value was stored.
    Applied { percent: u8 },
    /// The task is already terminal; nothing changed.
    Terminal,
    /// No task with this id is registered.
    UnknownTask,
}

/// Result of a terminal transition ([`TaskRegistry::mark_success`] /
/// [`TaskRegistry::mark_failed`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// This call moved the task into a terminal state.
    Applied(TaskRecord),
    /// The task was already terminal; the unchanged record is returned.
    AlreadyTerminal(TaskRecord),
    /// No task with this id is registered.
    UnknownTask,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Task {0} is already registered")]
    DuplicateTask(TaskId),
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        CoreError::Conflict(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// TaskRegistry
// ---------------------------------------------------------------------------

/// Concurrent registry of task records keyed by task id.
///
/// Designed to be shared via `Arc<TaskRegistry>`.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: DashMap<TaskId, TaskRecord>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task in `Uploading` state with zero progress.
    pub fn submit(
        &self,
        task_id: impl Into<TaskId>,
        metadata: TaskMetadata,
    ) -> Result<TaskRecord, RegistryError> {
        let task_id = task_id.into();
        match self.tasks.entry(task_id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateTask(task_id)),
            Entry::Vacant(slot) => {
                let record = TaskRecord {
                    task_id,
                    file_name: metadata.file_name,
                    file_type: metadata.file_type,
                    owner: metadata.owner,
                    status: TaskStatus::Uploading,
                    progress: 0,
                    phase: None,
                    created_at: chrono::Utc::now(),
                    artifact_ref: None,
                    failure_reason: None,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Store a progress value (clamped to `0..=100`) and phase label.
    ///
    /// Lower values after higher ones are accepted as-is; only terminal
    /// tasks refuse updates.
    pub fn update_progress(
        &self,
        task_id: &str,
        percent: f64,
        phase: Option<&str>,
    ) -> ProgressUpdate {
        let Some(mut record) = self.tasks.get_mut(task_id) else {
            return ProgressUpdate::UnknownTask;
        };
        if record.is_terminal() {
            return ProgressUpdate::Terminal;
        }

        let percent = clamp_percent(percent);
        record.progress = percent;
        if let Some(phase) = phase {
            record.phase = Some(phase.to_string());
        }
        ProgressUpdate::Applied { percent }
    }

    /// Move the task to `Success`, set progress to 100 and freeze the
    /// artifact reference. Idempotent.
    pub fn mark_success(&self, task_id: &str, artifact_ref: &str) -> Transition {
        self.transition(task_id, |record| {
            record.status = TaskStatus::Success;
            record.progress = PROGRESS_MAX;
            record.artifact_ref = Some(artifact_ref.to_string());
        })
    }

    /// Move the task to `Failed`, keeping the last progress value. Idempotent.
    pub fn mark_failed(&self, task_id: &str, reason: Option<&str>) -> Transition {
        self.transition(task_id, |record| {
            record.status = TaskStatus::Failed;
            record.failure_reason = reason.map(str::to_string);
        })
    }

    fn transition(&self, task_id: &str, apply: impl FnOnce(&mut TaskRecord)) -> Transition {
        let Some(mut record) = self.tasks.get_mut(task_id) else {
            return Transition::UnknownTask;
        };
        if record.is_terminal() {
            return Transition::AlreadyTerminal(record.clone());
        }
        apply(record.value_mut());
        Transition::Applied(record.clone())
    }

    /// Snapshot of a single task.
    pub fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks.get(task_id).map(|r| r.clone())
    }

    /// Snapshots of every task matching `filter`, in no particular order.
    pub fn list(&self, filter: &TaskFilter) -> Vec<TaskRecord> {
        self.tasks
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Erase a task. Only used by explicit user cancellation.
    pub fn remove(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks.remove(task_id).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
