//! In-memory deployment record store.

use std::collections::HashMap;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::records::{DeploymentRecord, DeploymentStatus};
use crate::repository::{
    DeploymentFilter, DeploymentRepository, Page, RepositoryError, RepositoryResult,
};

#[derive(Default)]
struct Store {
    by_id: HashMap<Uuid, DeploymentRecord>,
    by_contract_address: HashMap<Address, Uuid>,
    by_transaction_hash: HashMap<TxHash, Uuid>,
}

impl Store {
    /// Keep the natural-key indexes in step with a record snapshot.
    fn reindex(&mut self, previous: Option<&DeploymentRecord>, current: &DeploymentRecord) {
        if let Some(prev) = previous {
            if let Some(addr) = prev.contract_address() {
                self.by_contract_address.remove(&addr);
            }
            if let Some(hash) = prev.transaction_hash() {
                self.by_transaction_hash.remove(&hash);
            }
        }
        if let Some(addr) = current.contract_address() {
            self.by_contract_address.insert(addr, current.id());
        }
        if let Some(hash) = current.transaction_hash() {
            self.by_transaction_hash.insert(hash, current.id());
        }
    }
}

/// Coarse-locked in-memory [`DeploymentRepository`].
#[derive(Default)]
pub struct InMemoryDeploymentRepository {
    inner: RwLock<Store>,
}

impl InMemoryDeploymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeploymentRepository for InMemoryDeploymentRepository {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<DeploymentRecord>> {
        let store = self.inner.read().await;
        Ok(store.by_id.get(&id).cloned())
    }

    async fn get_by_contract_address(
        &self,
        address: Address,
    ) -> RepositoryResult<Option<DeploymentRecord>> {
        let store = self.inner.read().await;
        Ok(store
            .by_contract_address
            .get(&address)
            .and_then(|id| store.by_id.get(id))
            .cloned())
    }

    async fn get_by_transaction_hash(
        &self,
        hash: TxHash,
    ) -> RepositoryResult<Option<DeploymentRecord>> {
        let store = self.inner.read().await;
        Ok(store
            .by_transaction_hash
            .get(&hash)
            .and_then(|id| store.by_id.get(id))
            .cloned())
    }

    async fn list(
        &self,
        filter: &DeploymentFilter,
        page: Page,
    ) -> RepositoryResult<Vec<DeploymentRecord>> {
        let store = self.inner.read().await;
        let mut records: Vec<DeploymentRecord> = store
            .by_id
            .values()
            .filter(|dep| filter.matches(dep))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records.into_iter().skip(page.skip).take(page.take).collect())
    }

    async fn count(&self, filter: &DeploymentFilter) -> RepositoryResult<usize> {
        let store = self.inner.read().await;
        Ok(store.by_id.values().filter(|dep| filter.matches(dep)).count())
    }

    async fn count_by_status(
        &self,
        filter: &DeploymentFilter,
    ) -> RepositoryResult<HashMap<DeploymentStatus, usize>> {
        let store = self.inner.read().await;
        let mut counts = HashMap::new();
        for dep in store.by_id.values().filter(|dep| filter.matches(dep)) {
            *counts.entry(dep.status()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn add(&self, dep: DeploymentRecord) -> RepositoryResult<DeploymentRecord> {
        let mut store = self.inner.write().await;
        if let Some(addr) = dep.contract_address() {
            if store.by_contract_address.contains_key(&addr) {
                return Err(RepositoryError::DuplicateAddress(addr));
            }
        }
        if let Some(hash) = dep.transaction_hash() {
            if store.by_transaction_hash.contains_key(&hash) {
                return Err(RepositoryError::DuplicateHash(hash));
            }
        }
        store.reindex(None, &dep);
        store.by_id.insert(dep.id(), dep.clone());
        Ok(dep)
    }

    async fn update(&self, dep: DeploymentRecord) -> RepositoryResult<DeploymentRecord> {
        let mut store = self.inner.write().await;
        let Some(previous) = store.by_id.get(&dep.id()).cloned() else {
            return Err(RepositoryError::Missing(dep.id()));
        };
        store.reindex(Some(&previous), &dep);
        store.by_id.insert(dep.id(), dep.clone());
        Ok(dep)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut store = self.inner.write().await;
        match store.by_id.remove(&id) {
            Some(dep) => {
                if let Some(addr) = dep.contract_address() {
                    store.by_contract_address.remove(&addr);
                }
                if let Some(hash) = dep.transaction_hash() {
                    store.by_transaction_hash.remove(&hash);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_unsettled(&self) -> RepositoryResult<Vec<DeploymentRecord>> {
        let store = self.inner.read().await;
        let mut unsettled: Vec<DeploymentRecord> = store
            .by_id
            .values()
            .filter(|dep| dep.status().is_unsettled())
            .cloned()
            .collect();
        unsettled.sort_by_key(|dep| dep.created_at());
        Ok(unsettled)
    }
}
