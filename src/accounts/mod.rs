//! Account registration and password login.
//!
//! Both services are stateless: each holds an injected [`UserRepository`] and
//! [`PasswordHasher`] and keeps no per-request state of its own.
//!
//! - **Registration** checks the username with a fast-path lookup, hashes the
//!   password off the async runtime, and inserts. The store's uniqueness
//!   constraint is authoritative: an insert conflict is reported the same way
//!   as a pre-check hit.
//! - **Login** collapses "unknown user" and "wrong password" into one
//!   [`AuthError::InvalidCredentials`] and does the same hashing work on both
//!   paths.

pub mod hasher;
pub mod login;
pub mod memory;
pub mod postgres;
pub mod register;
pub mod repository;
pub(crate) mod utils;

pub use self::hasher::{Argon2Hasher, HashCost, HashError, PasswordHasher};
pub use self::login::{Credentials, LoginService, Session};
pub use self::memory::MemoryUserRepository;
pub use self::postgres::PgUserRepository;
pub use self::register::{NewAccount, RegistrationService};
pub use self::repository::{InsertOutcome, Lookup, StoreError, UserRepository};

use std::fmt;
use thiserror::Error;

/// A persisted user identity.
///
/// `password_hash` is a PHC string; it never leaves the service boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("user already exists")]
    Conflict,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("failed to generate session token: {0}")]
    SessionToken(String),
}
