//! In-process [`UserRepository`], used by tests and embedders that do not
//! need persistence.

use async_trait::async_trait;
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::RwLock;

use super::{
    Account,
    repository::{InsertOutcome, Lookup, StoreError, UserRepository},
};

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }

    pub async fn get(&self, username: &str) -> Option<Account> {
        self.accounts.read().await.get(username).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Lookup, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(username)
            .cloned()
            .map_or(Lookup::NotFound, Lookup::Found))
    }

    async fn insert(&self, account: &Account) -> Result<InsertOutcome, StoreError> {
        // Check and insert under one write guard.
        match self.accounts.write().await.entry(account.username.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(account.clone());
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
