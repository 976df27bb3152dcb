//! The narrow store interface the account services depend on.

use async_trait::async_trait;
use std::{future::Future, time::Duration};
use thiserror::Error;

use super::Account;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("store did not answer within {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a username lookup. Store failures are a separate `Err`, so
/// "not found" can never be mistaken for "could not look".
#[derive(Debug)]
pub enum Lookup {
    Found(Account),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// The store's uniqueness constraint on `username` rejected the row.
    Conflict,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Lookup, StoreError>;

    /// Insert a new account. Must be atomic with respect to username
    /// uniqueness: of two concurrent inserts for one username, exactly one
    /// returns [`InsertOutcome::Created`].
    async fn insert(&self, account: &Account) -> Result<InsertOutcome, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Bound a repository call by `deadline`.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| StoreError::Timeout(deadline))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn with_deadline_times_out_slow_store() {
        let result = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert!(matches!(result, Err(StoreError::Timeout(d)) if d == Duration::from_millis(50)));
    }
}
