//! Terminal outcome notifications.
//!
//! [`NotificationDispatcher`] owns a bounded queue drained by a fixed pool
//! of worker tasks. The callback path enqueues a [`NotifyRequest`] and
//! returns immediately; a worker then resolves the owner, persists the
//! notification once per task, and pushes it to every registered device.
//! Each device is attempted once; one failed push never affects another.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fileguard_core::notification::PUSH_TITLE;
use fileguard_core::task::{FileType, TaskStatus};
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

use crate::delivery::push::{PushMessage, PushSender};
use crate::directory::{NewNotification, NotificationStore, OwnerDirectory};

/// Dispatcher sizing and drain budget.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub shutdown_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

/// One terminal outcome to record and push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    /// Owner identity captured when the task was submitted.
    pub owner: String,
    pub task_id: String,
    pub status: TaskStatus,
    pub file_name: String,
    pub file_type: FileType,
    pub message: String,
}

struct Collaborators {
    directory: Arc<dyn OwnerDirectory>,
    store: Arc<dyn NotificationStore>,
    push: Arc<dyn PushSender>,
}

/// Bounded worker pool for notification persistence and push delivery.
pub struct NotificationDispatcher {
    sender: Mutex<Option<mpsc::Sender<NotifyRequest>>>,
    tracker: TaskTracker,
    shutdown_timeout: Duration,
}

impl NotificationDispatcher {
    /// Start the worker pool. Must be called from within a tokio runtime.
    pub fn start(
        config: DispatcherConfig,
        directory: Arc<dyn OwnerDirectory>,
        store: Arc<dyn NotificationStore>,
        push: Arc<dyn PushSender>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let collaborators = Arc::new(Collaborators {
            directory,
            store,
            push,
        });

        let tracker = TaskTracker::new();
        let workers = config.workers.max(1);
        for worker in 0..workers {
            let receiver = Arc::clone(&receiver);
            let collaborators = Arc::clone(&collaborators);
            tracker.spawn(async move {
                loop {
                    let next = receiver.lock().await.recv().await;
                    let Some(request) = next else {
                        break;
                    };
                    process(&collaborators, request).await;
                }
                tracing::debug!(worker, "Notification worker stopped");
            });
        }
        tracker.close();

        tracing::info!(
            workers,
            queue_capacity = config.queue_capacity,
            "Notification dispatcher started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            tracker,
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    /// Enqueue a notification without waiting for it to be processed.
    ///
    /// Drops the request with a warning when the queue is full or the
    /// dispatcher has been shut down.
    pub fn notify(&self, request: NotifyRequest) {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            tracing::warn!(task_id = %request.task_id, "Dispatcher shut down, notification dropped");
            return;
        };

        match sender.try_send(request) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(request)) => {
                tracing::warn!(task_id = %request.task_id, "Notification queue full, notification dropped");
            }
            Err(mpsc::error::TrySendError::Closed(request)) => {
                tracing::warn!(task_id = %request.task_id, "Notification queue closed, notification dropped");
            }
        }
    }

    /// Stop accepting requests and wait for queued ones to drain, up to the
    /// configured budget.
    pub async fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(sender);

        match tokio::time::timeout(self.shutdown_timeout, self.tracker.wait()).await {
            Ok(()) => tracing::info!("Notification dispatcher drained"),
            Err(_) => tracing::warn!(
                timeout_secs = self.shutdown_timeout.as_secs(),
                "Notification dispatcher did not drain in time"
            ),
        }
    }
}

async fn process(collaborators: &Collaborators, request: NotifyRequest) {
    let task_id = request.task_id.as_str();

    let owner = match collaborators.directory.resolve(&request.owner).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            tracing::debug!(task_id, owner = %request.owner, "Owner not resolvable, notification skipped");
            return;
        }
        Err(e) => {
            tracing::error!(task_id, error = %e, "Owner lookup failed");
            return;
        }
    };

    let notification = NewNotification {
        user_id: owner.user_id,
        task_id: request.task_id.clone(),
        status: request.status,
        file_name: request.file_name.clone(),
        file_type: request.file_type,
        message: request.message.clone(),
    };
    match collaborators.store.create_once(&notification).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(task_id, "Notification already recorded, push skipped");
            return;
        }
        // Push still goes out; the stored list is what the client reconciles against.
        Err(e) => tracing::error!(task_id, error = %e, "Failed to persist notification"),
    }

    let sends = owner.device_tokens.iter().map(|token| {
        let message = PushMessage {
            token: token.clone(),
            title: PUSH_TITLE.to_string(),
            body: request.message.clone(),
            task_id: request.task_id.clone(),
            status: request.status,
        };
        async move {
            let result = collaborators.push.send(&message).await;
            (message.token, result)
        }
    });

    for (token, result) in join_all(sends).await {
        if let Err(e) = result {
            tracing::warn!(task_id, token = %token, error = %e, "Push delivery failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
