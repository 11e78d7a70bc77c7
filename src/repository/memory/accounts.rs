//! In-memory account store.

use std::collections::HashMap;

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::records::Account;
use crate::repository::{
    AccountFilter, AccountRepository, Page, RepositoryError, RepositoryResult,
};

#[derive(Default)]
struct Store {
    by_id: HashMap<Uuid, Account>,
    by_address: HashMap<Address, Uuid>,
}

/// Coarse-locked in-memory [`AccountRepository`].
#[derive(Default)]
pub struct InMemoryAccountRepository {
    inner: RwLock<Store>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<Account>> {
        let store = self.inner.read().await;
        Ok(store.by_id.get(&id).cloned())
    }

    async fn get_by_address(&self, address: Address) -> RepositoryResult<Option<Account>> {
        let store = self.inner.read().await;
        Ok(store
            .by_address
            .get(&address)
            .and_then(|id| store.by_id.get(id))
            .cloned())
    }

    async fn list(&self, filter: &AccountFilter, page: Page) -> RepositoryResult<Vec<Account>> {
        let store = self.inner.read().await;
        let mut accounts: Vec<Account> = store
            .by_id
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(accounts.into_iter().skip(page.skip).take(page.take).collect())
    }

    async fn count(&self, filter: &AccountFilter) -> RepositoryResult<usize> {
        let store = self.inner.read().await;
        Ok(store.by_id.values().filter(|a| filter.matches(a)).count())
    }

    async fn add(&self, account: Account) -> RepositoryResult<Account> {
        let mut store = self.inner.write().await;
        if store.by_address.contains_key(&account.address()) {
            return Err(RepositoryError::DuplicateAddress(account.address()));
        }
        store.by_address.insert(account.address(), account.id());
        store.by_id.insert(account.id(), account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> RepositoryResult<Account> {
        let mut store = self.inner.write().await;
        if !store.by_id.contains_key(&account.id()) {
            return Err(RepositoryError::Missing(account.id()));
        }
        store.by_id.insert(account.id(), account.clone());
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut store = self.inner.write().await;
        match store.by_id.remove(&id) {
            Some(account) => {
                store.by_address.remove(&account.address());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, address: Address) -> RepositoryResult<bool> {
        let store = self.inner.read().await;
        Ok(store.by_address.contains_key(&address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AccountKind;
    use std::sync::Arc;

    fn account(byte: u8) -> Account {
        Account::new(
            Address::repeat_byte(byte),
            AccountKind::ExternallyOwned,
            None,
            None,
        )
    }

    #[tokio::test]
    async fn test_add_get_roundtrip() {
        let repo = InMemoryAccountRepository::new();
        let added = repo.add(account(1)).await.unwrap();

        let by_id = repo.get(added.id()).await.unwrap().unwrap();
        assert_eq!(by_id.address(), added.address());

        let by_addr = repo
            .get_by_address(Address::repeat_byte(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_addr.id(), added.id());
        assert!(repo.exists(Address::repeat_byte(1)).await.unwrap());
        assert!(!repo.exists(Address::repeat_byte(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_address_rejected() {
        let repo = InMemoryAccountRepository::new();
        repo.add(account(1)).await.unwrap();

        let err = repo.add(account(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateAddress(_)));
        assert_eq!(repo.count(&AccountFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_adds_one_winner() {
        let repo = Arc::new(InMemoryAccountRepository::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.add(account(7)).await }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(RepositoryError::DuplicateAddress(_)) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let repo = InMemoryAccountRepository::new();
        for byte in 1..=5 {
            repo.add(account(byte)).await.unwrap();
        }
        let mut third = repo
            .get_by_address(Address::repeat_byte(3))
            .await
            .unwrap()
            .unwrap();
        third.deactivate();
        repo.update(third).await.unwrap();

        let active = AccountFilter {
            is_active: Some(true),
            ..Default::default()
        };
        assert_eq!(repo.count(&active).await.unwrap(), 4);

        let page = repo
            .list(&active, Page { skip: 0, take: 2 })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_clears_address_index() {
        let repo = InMemoryAccountRepository::new();
        let added = repo.add(account(9)).await.unwrap();

        assert!(repo.delete(added.id()).await.unwrap());
        assert!(!repo.delete(added.id()).await.unwrap());
        assert!(!repo.exists(Address::repeat_byte(9)).await.unwrap());

        // Address is free again.
        repo.add(account(9)).await.unwrap();
    }
}
