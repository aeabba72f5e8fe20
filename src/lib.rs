//! # Appunti (multi-user notes service)
//!
//! `appunti` is a small HTTP service for personal text notes. Users register
//! and authenticate with a username/password pair, then manage their own
//! notes over a JSON API. Administrators get an extra surface for aggregate
//! statistics and user management.
//!
//! ## Authentication
//!
//! Authentication is stateless: a successful registration or login returns a
//! signed, short-lived bearer token (HS256). The same token can travel over
//! two transports:
//!
//! - `Authorization: Bearer <token>` for programmatic API clients.
//! - The `appunti_session` cookie, set by `POST /admin/login`, for
//!   browser-based admin sessions.
//!
//! Both channels are verified by the same issuer; the header is tried first
//! and the cookie is the fallback.
//!
//! ## Authorization
//!
//! A note is visible and mutable only by its owner or an administrator.
//! Admin-only operations (user listing, user deletion, cross-user note
//! listing, aggregate stats) fail with `403 Forbidden` for regular users,
//! never with silently filtered results.
//!
//! ## Storage
//!
//! SQLite via sqlx. Each operation acquires a pooled connection; username
//! uniqueness is enforced by the storage constraint and translated to a
//! validation error at the store boundary. Deleting a user removes the user
//! row and all of their notes in a single transaction.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
