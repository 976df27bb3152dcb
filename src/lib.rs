//! # Passgate (account registration and password login)
//!
//! `passgate` registers user accounts and authenticates them over HTTP.
//!
//! ## Accounts
//!
//! - **Uniqueness:** usernames are unique. The lookup before insert is only a
//!   fast path; the store's constraint on `username` decides, and a constraint
//!   violation is reported as an ordinary "user already exists".
//! - **Passwords:** stored as Argon2id PHC strings. Verification reads the cost
//!   from the stored hash, so the configured cost can be raised without
//!   invalidating existing accounts.
//! - **Responses:** the password hash never leaves the service.
//!
//! ## Login
//!
//! Unknown usernames and wrong passwords produce the same `401` with the same
//! message, and both paths perform one hash comparison. A successful login
//! returns a random 256-bit session token in the body and in the
//! `session_token` cookie.

pub mod accounts;
pub mod api;
pub mod cli;

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
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
