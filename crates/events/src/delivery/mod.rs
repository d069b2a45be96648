//! External delivery channels for terminal task notifications.

pub mod push;
