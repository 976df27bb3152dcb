use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};

use super::{
    AuthError,
    hasher::{HashError, PasswordHasher},
    repository::{Lookup, UserRepository, with_deadline},
    utils::{generate_session_token, is_blank, valid_username},
};

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// A successful login: who logged in and the freshly minted bearer token.
#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub email: String,
    pub token: SecretString,
}

pub struct LoginService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    store_timeout: Duration,
    // Verified against when the username is unknown, so both rejection paths
    // pay for one hash comparison.
    decoy_hash: String,
}

impl LoginService {
    /// # Errors
    /// Returns an error if the decoy hash cannot be computed.
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        store_timeout: Duration,
    ) -> Result<Self, HashError> {
        let decoy = generate_session_token().map_err(|e| HashError::Hash(e.to_string()))?;
        let decoy_hash = hasher.hash(&decoy)?;
        Ok(Self {
            repository,
            hasher,
            store_timeout,
            decoy_hash,
        })
    }

    /// Authenticate `credentials` and issue a session token.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`] for empty input, unknown usernames
    ///   and wrong passwords alike
    /// - [`AuthError::Store`] if the lookup fails
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session, AuthError> {
        if is_blank(&credentials.username) || credentials.password.expose_secret().is_empty() {
            debug!("rejected: empty credentials");
            return Err(AuthError::InvalidCredentials);
        }

        // No stored username can match, and the store may refuse the bytes.
        if !valid_username(&credentials.username) {
            debug!("rejected: malformed username");
            return Err(AuthError::InvalidCredentials);
        }

        let lookup = with_deadline(
            self.store_timeout,
            self.repository.find_by_username(&credentials.username),
        )
        .await?;

        let (account, stored_hash) = match lookup {
            Lookup::Found(account) => {
                let hash = account.password_hash.clone();
                (Some(account), hash)
            }
            Lookup::NotFound => (None, self.decoy_hash.clone()),
        };

        let verified = self.verify(credentials.password, stored_hash).await?;

        let account = match account {
            Some(account) if verified => account,
            Some(_) => {
                debug!("rejected: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                debug!("rejected: unknown username");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token =
            generate_session_token().map_err(|e| AuthError::SessionToken(e.to_string()))?;

        debug!("session issued");

        Ok(Session {
            username: account.username,
            email: account.email,
            token: SecretString::from(token),
        })
    }

    async fn verify(&self, password: SecretString, hash: String) -> Result<bool, HashError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &hash))
            .await
            .map_err(|e| HashError::Task(e.to_string()))
    }
}
