//! In-memory transaction record store.

use std::collections::HashMap;

use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::records::{TransactionRecord, TransactionStatus};
use crate::repository::{
    Page, RepositoryError, RepositoryResult, TransactionFilter, TransactionRepository,
};

#[derive(Default)]
struct Store {
    by_id: HashMap<Uuid, TransactionRecord>,
    by_hash: HashMap<TxHash, Uuid>,
}

/// Coarse-locked in-memory [`TransactionRepository`].
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    inner: RwLock<Store>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<TransactionRecord>> {
        let store = self.inner.read().await;
        Ok(store.by_id.get(&id).cloned())
    }

    async fn get_by_hash(&self, hash: TxHash) -> RepositoryResult<Option<TransactionRecord>> {
        let store = self.inner.read().await;
        Ok(store
            .by_hash
            .get(&hash)
            .and_then(|id| store.by_id.get(id))
            .cloned())
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> RepositoryResult<Vec<TransactionRecord>> {
        let store = self.inner.read().await;
        let mut records: Vec<TransactionRecord> = store
            .by_id
            .values()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records.into_iter().skip(page.skip).take(page.take).collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> RepositoryResult<usize> {
        let store = self.inner.read().await;
        Ok(store.by_id.values().filter(|tx| filter.matches(tx)).count())
    }

    async fn count_by_status(
        &self,
        filter: &TransactionFilter,
    ) -> RepositoryResult<HashMap<TransactionStatus, usize>> {
        let store = self.inner.read().await;
        let mut counts = HashMap::new();
        for tx in store.by_id.values().filter(|tx| filter.matches(tx)) {
            *counts.entry(tx.status()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn sum_amount(&self, filter: &TransactionFilter) -> RepositoryResult<U256> {
        let store = self.inner.read().await;
        Ok(store
            .by_id
            .values()
            .filter(|tx| filter.matches(tx))
            .fold(U256::ZERO, |acc, tx| acc + tx.amount()))
    }

    async fn add(&self, tx: TransactionRecord) -> RepositoryResult<TransactionRecord> {
        let mut store = self.inner.write().await;
        if store.by_hash.contains_key(&tx.hash()) {
            return Err(RepositoryError::DuplicateHash(tx.hash()));
        }
        store.by_hash.insert(tx.hash(), tx.id());
        store.by_id.insert(tx.id(), tx.clone());
        Ok(tx)
    }

    async fn update(&self, tx: TransactionRecord) -> RepositoryResult<TransactionRecord> {
        let mut store = self.inner.write().await;
        if !store.by_id.contains_key(&tx.id()) {
            return Err(RepositoryError::Missing(tx.id()));
        }
        store.by_id.insert(tx.id(), tx.clone());
        Ok(tx)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut store = self.inner.write().await;
        match store.by_id.remove(&id) {
            Some(tx) => {
                store.by_hash.remove(&tx.hash());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_pending(&self) -> RepositoryResult<Vec<TransactionRecord>> {
        let store = self.inner.read().await;
        let mut pending: Vec<TransactionRecord> = store
            .by_id
            .values()
            .filter(|tx| tx.status() == TransactionStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|tx| tx.created_at());
        Ok(pending)
    }
}
