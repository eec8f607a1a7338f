//! # LeadCRM Shared Library
//!
//! Domain types and business rules shared by the LeadCRM API server.
//!
//! ## Module Organization
//!
//! - `identity`: Principal and account role types
//! - `access`: Visibility filter and mutation authorizer
//! - `services`: Lead assignment, category transitions, creation flows
//! - `notify`: Notification collaborator contract and sinks
//! - `store`: Storage abstraction with PostgreSQL and in-memory backends
//! - `models`: Database models and input types
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing and JWT tokens
//! - `error`: Domain error type

pub mod access;
pub mod auth;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;

/// Current version of the LeadCRM shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
