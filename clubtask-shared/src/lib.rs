//! # ClubTask Shared Library
//!
//! This crate contains the domain types, storage adapters, and business logic
//! used by the ClubTask API server.
//!
//! ## Module Organization
//!
//! - `models`: Member directory and task board snapshots
//! - `auth`: Password codec, authentication, role hierarchy, and session tokens
//! - `store`: Sheet store abstraction, snapshot cache, and table adapters
//! - `db`: PostgreSQL-backed sheet store
//! - `services`: Membership lifecycle and task services

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the ClubTask shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
