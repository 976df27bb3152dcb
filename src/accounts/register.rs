use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};

use super::{
    Account, AuthError,
    hasher::{HashError, PasswordHasher},
    repository::{InsertOutcome, Lookup, UserRepository, with_deadline},
    utils::{has_control_chars, is_blank, valid_email, valid_username},
};

/// Registration input. The password stays wrapped until it reaches the hasher.
#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: SecretString,
}

impl NewAccount {
    /// # Errors
    /// Returns [`AuthError::Validation`] if a field is empty, the username is
    /// not canonical, or a stored field carries control characters.
    pub fn validate(&self) -> Result<(), AuthError> {
        if is_blank(&self.username)
            || is_blank(&self.full_name)
            || is_blank(&self.email)
            || self.password.expose_secret().is_empty()
        {
            return Err(AuthError::Validation("All fields are required"));
        }

        if !valid_username(&self.username) {
            return Err(AuthError::Validation("Invalid username"));
        }

        if has_control_chars(&self.full_name) {
            return Err(AuthError::Validation("Invalid full name"));
        }

        if has_control_chars(&self.email) || !valid_email(&self.email) {
            return Err(AuthError::Validation("Invalid email"));
        }

        Ok(())
    }
}

pub struct RegistrationService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    store_timeout: Duration,
}

impl RegistrationService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            hasher,
            store_timeout,
        }
    }

    /// Create an account and return the stored representation.
    ///
    /// # Errors
    /// - [`AuthError::Validation`] for missing or malformed input
    /// - [`AuthError::Conflict`] if the username is taken, whether found by the
    ///   lookup or rejected by the store on insert
    /// - [`AuthError::Store`] / [`AuthError::Hash`] on infrastructure failure;
    ///   nothing is written in either case
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: NewAccount) -> Result<Account, AuthError> {
        request.validate()?;

        // Fast path only; the insert below is what enforces uniqueness.
        match with_deadline(
            self.store_timeout,
            self.repository.find_by_username(&request.username),
        )
        .await?
        {
            Lookup::Found(_) => {
                debug!("username already registered");
                return Err(AuthError::Conflict);
            }
            Lookup::NotFound => {}
        }

        let password_hash = self.hash(request.password).await?;

        let account = Account {
            username: request.username,
            full_name: request.full_name,
            email: request.email,
            password_hash,
        };

        match with_deadline(self.store_timeout, self.repository.insert(&account)).await? {
            InsertOutcome::Created => {
                debug!("account created");
                Ok(account)
            }
            InsertOutcome::Conflict => {
                debug!("username taken by a concurrent registration");
                Err(AuthError::Conflict)
            }
        }
    }

    async fn hash(&self, password: SecretString) -> Result<String, HashError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }
}
