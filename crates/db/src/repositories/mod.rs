//! Repository layer: one zero-sized struct per table with async query methods.

pub mod device_repo;
pub mod notification_repo;
pub mod user_repo;

pub use device_repo::DeviceRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;
