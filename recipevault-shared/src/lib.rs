//! # RecipeVault Shared Library
//!
//! This crate contains the types and business logic shared by the
//! RecipeVault API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and owner-scoped data access
//! - `auth`: JWT tokens, password hashing, request auth context
//! - `db`: Connection pool and migration helpers
//! - `media`: Filesystem blob store for recipe images

pub mod auth;
pub mod db;
pub mod media;
pub mod models;

/// Current version of the RecipeVault shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
