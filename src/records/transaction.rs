//! Transaction lifecycle records.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::TransitionError;

/// Textual hash shape: `0x` prefix plus 64 hex digits.
pub const HASH_PREFIX: &str = "0x";
pub const HASH_LEN: usize = 66;

/// Lifecycle state of a submitted transaction.
///
/// `Confirmed`, `Failed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle record of a single value transfer or contract send.
///
/// Created in `Pending` with the network-assigned hash at submission
/// time, transitioned exactly once to a terminal state, and retained for
/// audit thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    id: Uuid,
    hash: TxHash,
    from_address: Address,
    to_address: Address,
    /// Amount in wei.
    amount: U256,
    /// Gas price in wei.
    gas_price: u128,
    gas_limit: u64,
    gas_used: Option<u64>,
    status: TransactionStatus,
    block_number: Option<u64>,
    block_hash: Option<B256>,
    transaction_index: Option<u64>,
    contract_address: Option<Address>,
    input_data: Option<Bytes>,
    error_message: Option<String>,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hash: TxHash,
        from_address: Address,
        to_address: Address,
        amount: U256,
        gas_price: u128,
        gas_limit: u64,
        account_id: Uuid,
        input_data: Option<Bytes>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            hash,
            from_address,
            to_address,
            amount,
            gas_price,
            gas_limit,
            gas_used: None,
            status: TransactionStatus::Pending,
            block_number: None,
            block_hash: None,
            transaction_index: None,
            contract_address: None,
            input_data,
            error_message: None,
            account_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn from_address(&self) -> Address {
        self.from_address
    }

    pub fn to_address(&self) -> Address {
        self.to_address
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_used(&self) -> Option<u64> {
        self.gas_used
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn block_hash(&self) -> Option<B256> {
        self.block_hash
    }

    pub fn transaction_index(&self) -> Option<u64> {
        self.transaction_index
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract_address
    }

    pub fn input_data(&self) -> Option<&Bytes> {
        self.input_data.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn guard(&self, to: TransactionStatus) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        Ok(())
    }

    /// Settle the record from a successful receipt.
    pub fn mark_confirmed(
        &mut self,
        block_number: u64,
        block_hash: B256,
        transaction_index: u64,
        gas_used: u64,
        contract_address: Option<Address>,
    ) -> Result<(), TransitionError> {
        self.guard(TransactionStatus::Confirmed)?;
        self.status = TransactionStatus::Confirmed;
        self.block_number = Some(block_number);
        self.block_hash = Some(block_hash);
        self.transaction_index = Some(transaction_index);
        self.gas_used = Some(gas_used);
        self.contract_address = contract_address;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_failed(&mut self, error_message: impl Into<String>) -> Result<(), TransitionError> {
        self.guard(TransactionStatus::Failed)?;
        self.status = TransactionStatus::Failed;
        self.error_message = Some(error_message.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Administrative cancellation. Only reachable from `Pending`; once
    /// the network has settled the transaction this is rejected.
    pub fn mark_cancelled(&mut self) -> Result<(), TransitionError> {
        self.guard(TransactionStatus::Cancelled)?;
        self.status = TransactionStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Fee in wei: actual gas when settled, the limit otherwise.
    pub fn fee(&self) -> U256 {
        let gas = self.gas_used.unwrap_or(self.gas_limit);
        U256::from(gas) * U256::from(self.gas_price)
    }
}

/// Structural transaction hash validation: fixed prefix, fixed total
/// length, hex payload.
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == HASH_LEN
        && hash.starts_with(HASH_PREFIX)
        && hash[HASH_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
}
