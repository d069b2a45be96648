//! Worker callback handling.
//!
//! [`CallbackGateway`] applies the three worker signals to the task
//! registry, the event broadcaster, the download resolver and the
//! notification dispatcher, always in that order. Registry, broadcast and
//! resolver steps finish before the gateway returns, so a client polling
//! right after the callback response sees the new state. Notification work
//! is only enqueued.
//!
//! Each task has its own async lock, held from the registry mutation until
//! the broadcast is done, so live streams see updates in the same order as
//! the registry. User deletion goes through the same lock.
//!
//! Callbacks for unknown tasks and repeated terminal callbacks are
//! tolerated no-ops.

use std::sync::Arc;

use dashmap::DashMap;
use fileguard_core::notification::{failure_message, MESSAGE_SUCCESS};
use fileguard_core::types::TaskId;
use fileguard_events::{EventBroadcaster, NotificationDispatcher, NotifyRequest, TaskOutcome};
use fileguard_tracker::{DownloadResolver, ProgressUpdate, TaskRecord, TaskRegistry, Transition};
use tokio::sync::Mutex;

/// Failure reason streamed to subscribers of a task the user deleted.
pub const CANCELLED: &str = "cancelled";

/// Applies worker signals to the in-memory task state and fans them out.
pub struct CallbackGateway {
    registry: Arc<TaskRegistry>,
    downloads: Arc<DownloadResolver>,
    broadcaster: Arc<EventBroadcaster>,
    dispatcher: Arc<NotificationDispatcher>,
    /// Per-task ordering locks. An entry lives until the task reaches a
    /// terminal state or is discarded.
    order: DashMap<TaskId, Arc<Mutex<()>>>,
}

impl CallbackGateway {
    pub fn new(
        registry: Arc<TaskRegistry>,
        downloads: Arc<DownloadResolver>,
        broadcaster: Arc<EventBroadcaster>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            registry,
            downloads,
            broadcaster,
            dispatcher,
            order: DashMap::new(),
        }
    }

    /// Record a progress report and publish it to live streams.
    pub async fn on_progress(&self, task_id: &str, percent: f64, phase: Option<&str>) {
        let lock = self.order_lock(task_id);
        let _order = lock.lock().await;

        match self.registry.update_progress(task_id, percent, phase) {
            ProgressUpdate::Applied { percent } => {
                self.broadcaster
                    .publish_progress(task_id, percent, phase)
                    .await;
            }
            ProgressUpdate::Terminal => {
                tracing::debug!(task_id, "Progress for terminal task ignored");
                self.release(task_id);
            }
            ProgressUpdate::UnknownTask => {
                tracing::debug!(task_id, "Progress for unknown task ignored");
                self.release(task_id);
            }
        }
    }

    /// Complete a task: freeze it as successful, close its streams, record
    /// the artifact and notify the owner.
    pub async fn on_finished(&self, task_id: &str, artifact_ref: &str) {
        let lock = self.order_lock(task_id);
        let _order = lock.lock().await;

        let transition = self.registry.mark_success(task_id, artifact_ref);
        if let Some(record) = self.applied(task_id, transition) {
            self.broadcaster
                .publish_terminal(
                    task_id,
                    TaskOutcome::Success {
                        artifact_ref: artifact_ref.to_string(),
                    },
                )
                .await;
            self.downloads.record(task_id, artifact_ref);

            tracing::info!(task_id, artifact_ref, "Task completed");
            self.notify(record, MESSAGE_SUCCESS.to_string());
        }
        self.release(task_id);
    }

    /// Fail a task: freeze it as failed, close its streams and notify the
    /// owner.
    pub async fn on_failed(&self, task_id: &str, reason: Option<&str>) {
        let lock = self.order_lock(task_id);
        let _order = lock.lock().await;

        let transition = self.registry.mark_failed(task_id, reason);
        if let Some(record) = self.applied(task_id, transition) {
            self.broadcaster
                .publish_terminal(
                    task_id,
                    TaskOutcome::Failed {
                        reason: reason.map(str::to_string),
                    },
                )
                .await;

            tracing::info!(task_id, reason, "Task failed");
            self.notify(record, failure_message(reason));
        }
        self.release(task_id);
    }

    /// Drop every trace of a task on user request: registry record, download
    /// artifact and live streams (closed with a `cancelled` failure).
    ///
    /// Serialized with in-flight callbacks for the same task, so a completing
    /// task cannot re-record its artifact after the discard.
    pub async fn discard(&self, task_id: &str) -> Option<TaskRecord> {
        let lock = self.order_lock(task_id);
        let _order = lock.lock().await;

        let record = self.registry.remove(task_id);
        if let Some(record) = &record {
            self.downloads.forget(task_id);
            if !record.is_terminal() {
                self.broadcaster
                    .publish_terminal(
                        task_id,
                        TaskOutcome::Failed {
                            reason: Some(CANCELLED.to_string()),
                        },
                    )
                    .await;
            }
        }
        self.release(task_id);
        record
    }

    fn order_lock(&self, task_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.order.entry(task_id.to_string()).or_default().value())
    }

    /// Forget the ordering lock of a task that will publish nothing more.
    /// Called while still holding the lock; later callers get a fresh one
    /// and find the task terminal or gone.
    fn release(&self, task_id: &str) {
        self.order.remove(task_id);
    }

    /// Number of tasks that currently hold an ordering lock.
    pub fn ordered_tasks(&self) -> usize {
        self.order.len()
    }

    fn applied(&self, task_id: &str, transition: Transition) -> Option<TaskRecord> {
        match transition {
            Transition::Applied(record) => Some(record),
            Transition::AlreadyTerminal(record) => {
                tracing::debug!(task_id, status = %record.status, "Duplicate terminal callback ignored");
                None
            }
            Transition::UnknownTask => {
                tracing::debug!(task_id, "Terminal callback for unknown task ignored");
                None
            }
        }
    }

    fn notify(&self, record: TaskRecord, message: String) {
        self.dispatcher.notify(NotifyRequest {
            owner: record.owner,
            task_id: record.task_id,
            status: record.status,
            file_name: record.file_name,
            file_type: record.file_type,
            message,
        });
    }
}
