//! Access-token validation.
//!
//! Tokens are issued by the identity service; this crate only verifies
//! them. [`jwt::generate_access_token`] exists for tests and tooling.

pub mod jwt;
