pub mod callback;
pub mod devices;
pub mod files;
pub mod notifications;
pub mod stream;
