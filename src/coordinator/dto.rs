//! Request and snapshot DTOs.
//!
//! Records never leave the coordinator by reference; every operation
//! returns a serialisable snapshot assembled here. Request types carry
//! addresses and hashes as strings — validation and parsing is the
//! coordinator's first step.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::gateway::AbiValue;
use crate::records::{
    Account, AccountKind, ContractType, DeploymentRecord, DeploymentStatus, TransactionRecord,
    TransactionStatus,
};

/// Account state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: Uuid,
    pub address: Address,
    pub public_key: Option<String>,
    pub kind: AccountKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            address: account.address(),
            public_key: account.public_key().map(str::to_string),
            kind: account.kind(),
            is_active: account.is_active(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        }
    }
}

/// Account snapshot enriched with live balance and aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: AccountSnapshot,
    /// Balance in wei at query time; zero when the gateway is unreachable.
    pub balance_wei: U256,
    pub transaction_count: usize,
    pub deployment_count: usize,
}

/// Live balance lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceView {
    pub address: Address,
    pub balance_wei: U256,
    pub queried_at: DateTime<Utc>,
}

/// Transaction record state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub id: Uuid,
    pub hash: TxHash,
    pub from_address: Address,
    pub to_address: Address,
    pub amount_wei: U256,
    pub gas_price_wei: u128,
    pub gas_limit: u64,
    pub gas_used: Option<u64>,
    pub status: TransactionStatus,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub transaction_index: Option<u64>,
    pub contract_address: Option<Address>,
    pub error_message: Option<String>,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&TransactionRecord> for TransactionSnapshot {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            id: tx.id(),
            hash: tx.hash(),
            from_address: tx.from_address(),
            to_address: tx.to_address(),
            amount_wei: tx.amount(),
            gas_price_wei: tx.gas_price(),
            gas_limit: tx.gas_limit(),
            gas_used: tx.gas_used(),
            status: tx.status(),
            block_number: tx.block_number(),
            block_hash: tx.block_hash(),
            transaction_index: tx.transaction_index(),
            contract_address: tx.contract_address(),
            error_message: tx.error_message().map(str::to_string),
            account_id: tx.account_id(),
            created_at: tx.created_at(),
            updated_at: tx.updated_at(),
        }
    }
}

/// Deployment record state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSnapshot {
    pub id: Uuid,
    pub contract_name: String,
    pub contract_address: Option<Address>,
    pub transaction_hash: Option<TxHash>,
    pub contract_type: ContractType,
    pub status: DeploymentStatus,
    pub block_number: Option<u64>,
    pub deployment_cost_wei: U256,
    pub gas_used: u64,
    pub error_message: Option<String>,
    pub deployer_account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DeploymentRecord> for DeploymentSnapshot {
    fn from(dep: &DeploymentRecord) -> Self {
        Self {
            id: dep.id(),
            contract_name: dep.contract_name().to_string(),
            contract_address: dep.contract_address(),
            transaction_hash: dep.transaction_hash(),
            contract_type: dep.contract_type(),
            status: dep.status(),
            block_number: dep.block_number(),
            deployment_cost_wei: dep.deployment_cost(),
            gas_used: dep.gas_used(),
            error_message: dep.error_message().map(str::to_string),
            deployer_account_id: dep.deployer_account_id(),
            created_at: dep.created_at(),
            updated_at: dep.updated_at(),
        }
    }
}

/// Request to submit a value transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub from_address: String,
    pub to_address: String,
    /// Amount in wei; must be positive.
    pub amount: U256,
    /// Gas price in wei; quoted from the gateway when absent.
    pub gas_price: Option<u128>,
    /// Gas limit; estimated when absent.
    pub gas_limit: Option<u64>,
    pub private_key: String,
}

/// Request for a gas estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateGasRequest {
    pub from_address: String,
    pub to_address: String,
    pub amount: U256,
    pub data: Option<Bytes>,
}

/// Gas estimation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasEstimate {
    pub gas_units: u64,
}

/// Transaction listing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTransactionsRequest {
    pub account_id: Option<Uuid>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub status: Option<TransactionStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

/// Request to deploy a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployContractRequest {
    pub contract_name: String,
    /// Hex bytecode with `0x` prefix.
    pub bytecode: String,
    /// Contract ABI as a JSON document.
    pub abi: String,
    pub contract_type: ContractType,
    pub from_address: String,
    pub private_key: String,
    #[serde(default)]
    pub constructor_args: Vec<AbiValue>,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    pub source_code: Option<String>,
}

/// Deployment listing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDeploymentsRequest {
    pub deployer_account_id: Option<Uuid>,
    pub contract_type: Option<ContractType>,
    pub status: Option<DeploymentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

/// Request for a read-only contract method call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContractRequest {
    pub contract_address: String,
    pub abi: String,
    pub method_name: String,
    #[serde(default)]
    pub args: Vec<AbiValue>,
}

/// Read-only call result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallOutcome {
    pub contract_address: Address,
    pub method_name: String,
    pub result: AbiValue,
}

/// Request for a state-changing contract method invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendContractTransactionRequest {
    pub contract_address: String,
    pub abi: String,
    pub method_name: String,
    pub from_address: String,
    pub private_key: String,
    #[serde(default)]
    pub args: Vec<AbiValue>,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    /// Value attached to the call, in wei. Defaults to zero.
    pub value: Option<U256>,
}

/// Historical contract event query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractEventsRequest {
    pub contract_address: String,
    pub abi: String,
    pub event_name: String,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

/// Source verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyContractRequest {
    pub contract_address: String,
    pub source_code: String,
    pub contract_name: String,
    pub compiler_version: String,
    #[serde(default)]
    pub optimization_used: bool,
    #[serde(default)]
    pub runs: u32,
    pub constructor_args_encoded: Option<String>,
}

/// Aggregate transaction statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStats {
    pub account_id: Option<Uuid>,
    pub total_count: usize,
    /// Exact total of matching amounts, in wei.
    pub total_amount_wei: U256,
    pub by_status: HashMap<TransactionStatus, usize>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

/// Aggregate deployment statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStats {
    pub deployer_account_id: Option<Uuid>,
    pub total_count: usize,
    pub by_status: HashMap<DeploymentStatus, usize>,
}

/// Network reachability view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub connected: bool,
    pub block_number: Option<u64>,
}
