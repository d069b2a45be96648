//! Per-task fan-out of progress and terminal events to live subscribers.
//!
//! [`EventBroadcaster`] keeps, for each task id, the set of subscribers that
//! currently hold an open stream. A subscriber is only a bounded
//! `tokio::sync::mpsc` sender; the transport that drains the matching
//! [`Subscription`] (SSE, WebSocket, a test) is invisible to the broadcaster.
//!
//! Delivery guarantees:
//!
//! - Events for one task are delivered in publish order (publishes on the
//!   same task are serialized by a per-task async lock).
//! - Each subscriber gets at most `write_timeout` per event. A subscriber
//!   whose buffer stays full for that long, or whose receiver is gone, is
//!   evicted. Other subscribers are unaffected.
//! - A terminal event closes every subscriber of the task. Subscribers that
//!   register afterwards receive only `Start` and must fall back to polling.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use dashmap::DashMap;
use fileguard_core::types::TaskId;
use futures::future::join_all;
use tokio::sync::mpsc;

/// Default per-subscriber write bound.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default per-subscriber buffer capacity.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 32;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Terminal result of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success { artifact_ref: String },
    Failed { reason: Option<String> },
}

/// An event delivered to a task's subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Sent once, immediately on registration.
    Start,
    /// Clamped progress percentage.
    Progress(u8),
    /// Phase label accompanying a progress update.
    Phase(String),
    /// Final event; the subscription closes right after it.
    Finish(TaskOutcome),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// How long a single event may wait for room in a subscriber's buffer.
    pub write_timeout: Duration,
    /// Per-subscriber channel capacity.
    pub buffer: usize,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Subscriber {
    id: u64,
    sender: mpsc::Sender<TaskEvent>,
}

#[derive(Default)]
struct SubscriberSet {
    members: Vec<Subscriber>,
    /// Set once the terminal event went out (or on shutdown). A closed set
    /// never accepts new members.
    closed: bool,
}

#[derive(Default)]
struct TaskChannel {
    subscribers: Mutex<SubscriberSet>,
    /// Serializes publishes on this task so delivery order matches publish
    /// order.
    publish_lock: tokio::sync::Mutex<()>,
}

impl TaskChannel {
    fn lock(&self) -> MutexGuard<'_, SubscriberSet> {
        // A poisoned set only means a panic happened mid-update; the data is
        // a plain Vec and still usable.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot(&self) -> Vec<Subscriber> {
        self.lock().members.clone()
    }

    fn evict(&self, ids: &[u64]) {
        if ids.is_empty() {
            return;
        }
        self.lock().members.retain(|s| !ids.contains(&s.id));
    }

    fn close(&self) -> Vec<Subscriber> {
        let mut set = self.lock();
        set.closed = true;
        std::mem::take(&mut set.members)
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Receiving end of one subscriber.
///
/// Dropping the subscription unregisters it from the broadcaster.
pub struct Subscription {
    task_id: TaskId,
    id: u64,
    receiver: mpsc::Receiver<TaskEvent>,
    broadcaster: Weak<EventBroadcaster>,
}

impl Subscription {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event. Returns `None` once the subscription has been
    /// closed (after `Finish`, on eviction, or on shutdown).
    pub async fn recv(&mut self) -> Option<TaskEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broadcaster) = self.broadcaster.upgrade() {
            broadcaster.unsubscribe(&self.task_id, self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// EventBroadcaster
// ---------------------------------------------------------------------------

/// Fan-out hub for task events.
///
/// Must be shared as `Arc<EventBroadcaster>`; subscriptions keep a weak
/// reference back to it for unregistration.
pub struct EventBroadcaster {
    channels: DashMap<TaskId, Arc<TaskChannel>>,
    next_id: AtomicU64,
    shut_down: AtomicBool,
    config: BroadcasterConfig,
}

impl EventBroadcaster {
    pub fn new(config: BroadcasterConfig) -> Arc<Self> {
        Arc::new(Self {
            channels: DashMap::new(),
            next_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
            config,
        })
    }

    /// Register a new subscriber for `task_id` and emit `Start` to it.
    ///
    /// After [`shutdown`](Self::shutdown) the returned subscription is
    /// already closed and yields nothing.
    pub fn subscribe(self: &Arc<Self>, task_id: &str) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.config.buffer.max(1));

        let subscription = Subscription {
            task_id: task_id.to_string(),
            id,
            receiver,
            broadcaster: Arc::downgrade(self),
        };

        loop {
            if self.shut_down.load(Ordering::Acquire) {
                return subscription;
            }
            let channel = Arc::clone(
                self.channels
                    .entry(task_id.to_string())
                    .or_default()
                    .value(),
            );

            let mut set = channel.lock();
            if set.closed {
                // Lost a race with a terminal publish that is detaching this
                // channel; retry against a fresh one.
                drop(set);
                self.channels
                    .remove_if(task_id, |_, current| Arc::ptr_eq(current, &channel));
                continue;
            }

            // Fresh channel with capacity >= 1: this cannot fail.
            let _ = sender.try_send(TaskEvent::Start);
            set.members.push(Subscriber { id, sender });
            break;
        }

        tracing::debug!(task_id, subscriber_id = id, "Subscriber registered");
        subscription
    }

    /// Deliver a progress update (and its phase label, if any) to every
    /// current subscriber of `task_id`.
    pub async fn publish_progress(&self, task_id: &str, percent: u8, phase: Option<&str>) {
        let mut events = vec![TaskEvent::Progress(percent)];
        if let Some(phase) = phase {
            events.push(TaskEvent::Phase(phase.to_string()));
        }

        let Some(channel) = self.channel(task_id) else {
            return;
        };
        let _order = channel.publish_lock.lock().await;

        let subscribers = channel.snapshot();
        let failed = self.deliver(&subscribers, &events).await;
        if !failed.is_empty() {
            tracing::debug!(task_id, evicted = failed.len(), "Evicted unresponsive subscribers");
        }
        channel.evict(&failed);
    }

    /// Deliver the terminal event to every current subscriber of `task_id`,
    /// then close and discard all of them.
    pub async fn publish_terminal(&self, task_id: &str, outcome: TaskOutcome) {
        let Some((_, channel)) = self.channels.remove(task_id) else {
            return;
        };
        let _order = channel.publish_lock.lock().await;

        let subscribers = channel.close();
        let failed = self
            .deliver(&subscribers, &[TaskEvent::Finish(outcome)])
            .await;

        tracing::debug!(
            task_id,
            delivered = subscribers.len() - failed.len(),
            failed = failed.len(),
            "Terminal event published, subscribers closed"
        );
        // `subscribers` drops here, closing every sender.
    }

    /// Number of live subscribers for a task.
    pub fn subscriber_count(&self, task_id: &str) -> usize {
        self.channel(task_id)
            .map(|c| c.lock().members.len())
            .unwrap_or(0)
    }

    /// Number of tasks that currently have a subscriber set.
    pub fn tracked_tasks(&self) -> usize {
        self.channels.len()
    }

    /// Close every live subscriber and refuse new ones.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);

        let task_ids: Vec<TaskId> = self.channels.iter().map(|e| e.key().clone()).collect();
        let mut closed = 0;
        for task_id in task_ids {
            if let Some((_, channel)) = self.channels.remove(&task_id) {
                closed += channel.close().len();
            }
        }
        tracing::info!(closed, "Closed all task event subscribers");
    }

    fn channel(&self, task_id: &str) -> Option<Arc<TaskChannel>> {
        self.channels.get(task_id).map(|c| Arc::clone(c.value()))
    }

    fn unsubscribe(&self, task_id: &str, id: u64) {
        let Some(channel) = self.channel(task_id) else {
            return;
        };

        let now_empty = {
            let mut set = channel.lock();
            set.members.retain(|s| s.id != id);
            set.members.is_empty()
        };

        if now_empty {
            self.channels.remove_if(task_id, |_, current| {
                Arc::ptr_eq(current, &channel) && current.lock().members.is_empty()
            });
        }
    }

    /// Send `events` to each subscriber concurrently. Returns the ids of the
    /// subscribers that failed (closed receiver or write timeout).
    async fn deliver(&self, subscribers: &[Subscriber], events: &[TaskEvent]) -> Vec<u64> {
        let write_timeout = self.config.write_timeout;

        let results = join_all(subscribers.iter().map(|subscriber| async move {
            for event in events {
                match tokio::time::timeout(write_timeout, subscriber.sender.send(event.clone()))
                    .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        tracing::debug!(subscriber_id = subscriber.id, "Subscriber disconnected");
                        return Some(subscriber.id);
                    }
                    Err(_) => {
                        tracing::debug!(
                            subscriber_id = subscriber.id,
                            timeout_ms = write_timeout.as_millis() as u64,
                            "Subscriber write timed out"
                        );
                        return Some(subscriber.id);
                    }
                }
            }
            None
        }))
        .await;

        results.into_iter().flatten().collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
