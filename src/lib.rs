//! # Bookstore
//!
//! `bookstore` is a small book catalog API. Users sign up with an email and a
//! password, log in to obtain a short-lived bearer token (JWT), and use that
//! token to create, read, update and delete book records.
//!
//! ## Authentication
//!
//! - Passwords are stored as salted `bcrypt` hashes, never in plaintext.
//! - Login issues an HMAC-signed JWT whose `sub` claim is the user's email and
//!   whose `exp` claim bounds its lifetime. There is no revocation; tokens
//!   simply expire.
//! - Every `/books` route sits behind the bearer middleware. A missing,
//!   malformed, forged or expired token is answered with `403 Forbidden`.
//!
//! ## Persistence
//!
//! Two tables, `users` and `books`, live in Postgres. The schema in
//! `sql/schema.sql` is applied idempotently at startup. Email uniqueness is
//! enforced by the database, not only by the signup pre-check.

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
}
