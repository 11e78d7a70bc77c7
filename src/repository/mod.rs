//! Persistence boundary.
//!
//! # Data Flow
//! ```text
//! Coordinator (single writer)
//!     → AccountRepository / TransactionRepository / DeploymentRepository
//!     → memory/ reference implementations (coarse per-store lock)
//! ```
//!
//! The traits are the contract; any storage engine that keeps `add` /
//! `update` / `delete` serialised per store and enforces the unique-key
//! invariants (address, transaction hash) satisfies them. Reads are
//! eventually-consistent snapshots; no cross-repository transaction is
//! offered or required.

pub mod memory;

pub use memory::{
    InMemoryAccountRepository, InMemoryDeploymentRepository, InMemoryTransactionRepository,
};

use std::collections::HashMap;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::records::{
    Account, AccountKind, ContractType, DeploymentRecord, DeploymentStatus, TransactionRecord,
    TransactionStatus,
};

/// Failures surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Unique address constraint violated on insert.
    #[error("account address {0} already exists")]
    DuplicateAddress(Address),

    /// Unique transaction hash constraint violated on insert.
    #[error("transaction hash {0} already exists")]
    DuplicateHash(TxHash),

    /// Update or delete referenced a record that is not there.
    #[error("record {0} not found")]
    Missing(Uuid),

    /// Backing store failure. The in-memory stores never produce this;
    /// durable engines will.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Pagination window. Defaults to the first 50 records.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub skip: usize,
    pub take: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, take: 50 }
    }
}

/// Account listing filter. Default matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    pub kind: Option<AccountKind>,
    pub is_active: Option<bool>,
}

impl AccountFilter {
    fn matches(&self, account: &Account) -> bool {
        self.kind.is_none_or(|k| account.kind() == k)
            && self.is_active.is_none_or(|a| account.is_active() == a)
    }
}

/// Transaction listing filter. Default matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub from_address: Option<Address>,
    pub to_address: Option<Address>,
    pub status: Option<TransactionStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    fn matches(&self, tx: &TransactionRecord) -> bool {
        self.account_id.is_none_or(|id| tx.account_id() == id)
            && self.from_address.is_none_or(|a| tx.from_address() == a)
            && self.to_address.is_none_or(|a| tx.to_address() == a)
            && self.status.is_none_or(|s| tx.status() == s)
            && self.from_date.is_none_or(|d| tx.created_at() >= d)
            && self.to_date.is_none_or(|d| tx.created_at() <= d)
    }
}

/// Deployment listing filter. Default matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeploymentFilter {
    pub deployer_account_id: Option<Uuid>,
    pub contract_type: Option<ContractType>,
    pub status: Option<DeploymentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl DeploymentFilter {
    fn matches(&self, dep: &DeploymentRecord) -> bool {
        self.deployer_account_id
            .is_none_or(|id| dep.deployer_account_id() == id)
            && self.contract_type.is_none_or(|t| dep.contract_type() == t)
            && self.status.is_none_or(|s| dep.status() == s)
            && self.from_date.is_none_or(|d| dep.created_at() >= d)
            && self.to_date.is_none_or(|d| dep.created_at() <= d)
    }
}

/// Account persistence contract.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<Account>>;
    async fn get_by_address(&self, address: Address) -> RepositoryResult<Option<Account>>;
    /// Newest-first listing.
    async fn list(&self, filter: &AccountFilter, page: Page) -> RepositoryResult<Vec<Account>>;
    async fn count(&self, filter: &AccountFilter) -> RepositoryResult<usize>;
    /// Fails with [`RepositoryError::DuplicateAddress`] if the address is
    /// taken. The check and insert are atomic.
    async fn add(&self, account: Account) -> RepositoryResult<Account>;
    async fn update(&self, account: Account) -> RepositoryResult<Account>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
    async fn exists(&self, address: Address) -> RepositoryResult<bool>;
}

/// Transaction record persistence contract.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<TransactionRecord>>;
    /// Hash lookup works from submission time, before confirmation.
    async fn get_by_hash(&self, hash: TxHash) -> RepositoryResult<Option<TransactionRecord>>;
    /// Newest-first listing.
    async fn list(
        &self,
        filter: &TransactionFilter,
        page: Page,
    ) -> RepositoryResult<Vec<TransactionRecord>>;
    async fn count(&self, filter: &TransactionFilter) -> RepositoryResult<usize>;
    async fn count_by_status(
        &self,
        filter: &TransactionFilter,
    ) -> RepositoryResult<HashMap<TransactionStatus, usize>>;
    /// Exact wei total over the matching records; zero for an empty set.
    async fn sum_amount(&self, filter: &TransactionFilter) -> RepositoryResult<U256>;
    /// Fails with [`RepositoryError::DuplicateHash`] if the hash is taken.
    async fn add(&self, tx: TransactionRecord) -> RepositoryResult<TransactionRecord>;
    async fn update(&self, tx: TransactionRecord) -> RepositoryResult<TransactionRecord>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
    /// Pending records, oldest first. Feeds the reconciler.
    async fn list_pending(&self) -> RepositoryResult<Vec<TransactionRecord>>;
}

/// Deployment record persistence contract.
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<DeploymentRecord>>;
    async fn get_by_contract_address(
        &self,
        address: Address,
    ) -> RepositoryResult<Option<DeploymentRecord>>;
    async fn get_by_transaction_hash(
        &self,
        hash: TxHash,
    ) -> RepositoryResult<Option<DeploymentRecord>>;
    /// Newest-first listing.
    async fn list(
        &self,
        filter: &DeploymentFilter,
        page: Page,
    ) -> RepositoryResult<Vec<DeploymentRecord>>;
    async fn count(&self, filter: &DeploymentFilter) -> RepositoryResult<usize>;
    async fn count_by_status(
        &self,
        filter: &DeploymentFilter,
    ) -> RepositoryResult<HashMap<DeploymentStatus, usize>>;
    async fn add(&self, dep: DeploymentRecord) -> RepositoryResult<DeploymentRecord>;
    async fn update(&self, dep: DeploymentRecord) -> RepositoryResult<DeploymentRecord>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
    /// Pending/Deploying records, oldest first. Feeds the reconciler.
    async fn list_unsettled(&self) -> RepositoryResult<Vec<DeploymentRecord>>;
}
