//! Auth configuration and the shared per-process state handed to handlers.

use std::{sync::Arc, time::Duration};

use crate::accounts::{
    Argon2Hasher, HashCost, HashError, LoginService, PasswordHasher, RegistrationService,
    UserRepository,
};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_STORE_TIMEOUT_SECONDS: u64 = 5;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    hash_cost: HashCost,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    store_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hash_cost: HashCost::default(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    #[must_use]
    pub fn hash_cost(&self) -> HashCost {
        self.hash_cost
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }
}

pub struct AuthState {
    config: AuthConfig,
    repository: Arc<dyn UserRepository>,
    registration: RegistrationService,
    login: LoginService,
}

impl AuthState {
    /// Wire both services to `repository` with an Argon2id hasher at the
    /// configured cost.
    ///
    /// # Errors
    /// Returns an error if the hashing cost is invalid.
    pub fn new(config: AuthConfig, repository: Arc<dyn UserRepository>) -> Result<Self, HashError> {
        let hasher = Arc::new(Argon2Hasher::new(config.hash_cost())?);
        Self::with_hasher(config, repository, hasher)
    }

    /// # Errors
    /// Returns an error if the login decoy hash cannot be computed.
    pub fn with_hasher(
        config: AuthConfig,
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, HashError> {
        let registration = RegistrationService::new(
            Arc::clone(&repository),
            Arc::clone(&hasher),
            config.store_timeout(),
        );
        let login = LoginService::new(Arc::clone(&repository), hasher, config.store_timeout())?;
        Ok(Self {
            config,
            repository,
            registration,
            login,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<dyn UserRepository> {
        &self.repository
    }

    #[must_use]
    pub fn registration(&self) -> &RegistrationService {
        &self.registration
    }

    #[must_use]
    pub fn login(&self) -> &LoginService {
        &self.login
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::MemoryUserRepository;

    #[test]
    fn config_builders_override_defaults() {
        let config = AuthConfig::new()
            .with_session_ttl_seconds(60)
            .with_session_cookie_secure(true)
            .with_store_timeout(Duration::from_millis(250))
            .with_hash_cost(HashCost {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            });
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
        assert_eq!(config.store_timeout(), Duration::from_millis(250));
        assert_eq!(config.hash_cost().memory_kib, 8);
    }

    #[test]
    fn config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(!config.session_cookie_secure());
        assert_eq!(config.hash_cost(), HashCost::default());
    }

    #[test]
    fn invalid_hash_cost_fails_state_creation() {
        let config = AuthConfig::new().with_hash_cost(HashCost {
            memory_kib: 8,
            iterations: 0,
            parallelism: 1,
        });
        let result = AuthState::new(config, Arc::new(MemoryUserRepository::new()));
        assert!(matches!(result, Err(HashError::Params(_))));
    }
}
