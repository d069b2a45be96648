//! Task lifecycle orchestration.

pub mod callback;
