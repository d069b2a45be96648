//! Fileguard task event fan-out and notification infrastructure.
//!
//! - [`EventBroadcaster`]: per-task live subscriber sets for progress
//!   streams, with bounded per-subscriber writes.
//! - [`NotificationDispatcher`]: bounded worker pool that persists terminal
//!   outcome notifications and pushes them to the owner's devices.
//! - [`delivery`]: push delivery channels (FCM, logging).
//! - [`directory`]: the owner/device lookup and notification store seams.

pub mod broadcaster;
pub mod delivery;
pub mod directory;
pub mod dispatcher;

pub use broadcaster::{BroadcasterConfig, EventBroadcaster, Subscription, TaskEvent, TaskOutcome};
pub use delivery::push::{FcmPushSender, LogPushSender, PushError, PushMessage, PushSender};
pub use directory::{
    MemoryDirectory, NewNotification, NotificationStore, Owner, OwnerDirectory, PgDirectory,
    StoreError,
};
pub use dispatcher::{DispatcherConfig, NotificationDispatcher, NotifyRequest};
