//! External service boundaries.
//!
//! # Data Flow
//! ```text
//! Coordinator
//!     → BlockchainGateway (balances, gas, raw submission, receipts)
//!     → ContractGateway   (deploy, call, send, events, verification)
//!
//! rpc.rs implements BlockchainGateway over alloy JSON-RPC providers.
//! The contract engine stays external; only its trait lives here.
//! ```
//!
//! Gateways never touch the repositories; the coordinator is the single
//! writer of record state.

pub mod abi;
pub mod rpc;
pub mod wallet;

pub use abi::AbiValue;
pub use rpc::RpcBlockchainGateway;
pub use wallet::SigningMaterial;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised at the gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Request exceeded the configured timeout.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Response arrived but had an unexpected shape.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Key material could not be parsed or signing failed.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Operation was executed and reverted on-chain.
    #[error("reverted: {0}")]
    Reverted(String),

    /// Current gas price exceeds the configured ceiling.
    #[error("gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Gateway not configured or deliberately disabled.
    #[error("gateway not available: {0}")]
    NotAvailable(String),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Account material produced by key generation or import.
#[derive(Debug, Clone)]
pub struct GeneratedAccount {
    pub address: Address,
    /// Uncompressed public key, hex encoded.
    pub public_key: Option<String>,
    /// Opaque reference to the key material for later signing.
    pub key_ref: Option<String>,
}

/// A fully resolved value transfer ready for submission.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    /// Amount in wei.
    pub amount: U256,
    /// Gas price in wei.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub signer: SigningMaterial,
    pub data: Option<Bytes>,
}

/// Settled execution data read back from the network.
#[derive(Debug, Clone)]
pub struct OnChainReceipt {
    /// True when execution succeeded.
    pub succeeded: bool,
    pub block_number: Option<u64>,
    pub block_hash: Option<B256>,
    pub transaction_index: Option<u64>,
    pub gas_used: u64,
    /// Gas price actually charged, in wei.
    pub effective_gas_price: u128,
    /// Populated for contract-creating transactions.
    pub contract_address: Option<Address>,
}

impl OnChainReceipt {
    /// Total cost in wei.
    pub fn cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

/// Blockchain network boundary.
#[async_trait]
pub trait BlockchainGateway: Send + Sync {
    /// Generate a fresh externally-owned account.
    async fn create_account(&self) -> GatewayResult<GeneratedAccount>;

    /// Derive an account from existing key material.
    async fn import_account(&self, signer: &SigningMaterial) -> GatewayResult<GeneratedAccount>;

    /// Balance in wei. Requires no local record of the address.
    async fn balance(&self, address: Address) -> GatewayResult<U256>;

    /// Sign and submit; returns the network-assigned hash.
    async fn send_transaction(&self, request: &TransferRequest) -> GatewayResult<TxHash>;

    /// Gas units for the described call.
    async fn estimate_gas(
        &self,
        from: Address,
        to: Option<Address>,
        amount: U256,
        data: Option<Bytes>,
    ) -> GatewayResult<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> GatewayResult<u128>;

    /// Receipt for a hash; `None` while unmined.
    async fn receipt(&self, hash: TxHash) -> GatewayResult<Option<OnChainReceipt>>;

    /// Latest block number.
    async fn block_number(&self) -> GatewayResult<u64>;

    /// Cheap liveness probe.
    async fn is_connected(&self) -> bool;
}

/// A contract deployment ready for submission.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub contract_name: String,
    pub bytecode: Bytes,
    pub abi: String,
    pub deployer: Address,
    pub signer: SigningMaterial,
    pub constructor_args: Vec<AbiValue>,
    /// Gas price in wei.
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// Successful deployment outcome.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub contract_address: Address,
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// Total cost in wei.
    pub cost: U256,
}

/// A read-only contract method call.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub contract_address: Address,
    pub abi: String,
    pub method: String,
    pub args: Vec<AbiValue>,
}

/// A state-changing contract method invocation.
#[derive(Debug, Clone)]
pub struct ContractSend {
    pub contract_address: Address,
    pub abi: String,
    pub method: String,
    pub from: Address,
    pub signer: SigningMaterial,
    pub args: Vec<AbiValue>,
    /// Gas price in wei.
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Value attached to the call, in wei.
    pub value: U256,
}

/// Historical event query.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub contract_address: Address,
    pub abi: String,
    pub event_name: String,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
}

/// A decoded contract event.
#[derive(Debug, Clone)]
pub struct ContractEvent {
    pub name: String,
    pub transaction_hash: Option<TxHash>,
    pub block_number: Option<u64>,
    /// Decoded fields in declaration order.
    pub fields: Vec<(String, AbiValue)>,
}

/// Source verification request.
#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub contract_address: Address,
    pub source_code: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization: bool,
    pub runs: u32,
    pub constructor_args_encoded: Option<String>,
}

/// Smart-contract engine boundary (ABI encoding, deployment, events).
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn deploy(&self, request: &DeployRequest) -> GatewayResult<DeployOutcome>;

    /// Read-only call; nothing is submitted or persisted.
    async fn call(&self, request: &ContractCall) -> GatewayResult<AbiValue>;

    /// State-changing send; returns the network-assigned hash.
    async fn send(&self, request: &ContractSend) -> GatewayResult<TxHash>;

    async fn events(&self, request: &EventQuery) -> GatewayResult<Vec<ContractEvent>>;

    /// Source verification; true when the deployed code matches.
    async fn verify(&self, request: &VerifyRequest) -> GatewayResult<bool>;
}
