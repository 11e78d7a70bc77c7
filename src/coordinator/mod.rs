//! Lifecycle coordination.
//!
//! # Data Flow
//! ```text
//! caller request (DTO)
//!     → validation (field-named failures, before any network call)
//!     → gateway call (cancellable)
//!     → record construction + repository write (single writer)
//!     → snapshot DTO back to the caller
//! ```
//!
//! The coordinator is the only writer of record state. Gateways never
//! touch repositories; repositories never call gateways. Operations that
//! reach the network take a [`CancellationToken`]: cancellation before
//! submission aborts with nothing persisted, and cancellation observed
//! after submission leaves the already-written record intact.

pub mod accounts;
pub mod contracts;
pub mod dto;
pub mod stats;
pub mod transactions;

use std::future::Future;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use tokio_util::sync::CancellationToken;

use crate::config::GasConfig;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::gateway::{BlockchainGateway, ContractGateway, GatewayResult, SigningMaterial};
use crate::records::{account, transaction};
use crate::repository::{AccountRepository, DeploymentRepository, TransactionRepository};

/// Orchestrates validation, gateway calls and record persistence.
pub struct Coordinator {
    accounts: Arc<dyn AccountRepository>,
    transactions: Arc<dyn TransactionRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    chain: Arc<dyn BlockchainGateway>,
    contracts: Arc<dyn ContractGateway>,
    gas: GasConfig,
}

impl Coordinator {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        transactions: Arc<dyn TransactionRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        chain: Arc<dyn BlockchainGateway>,
        contracts: Arc<dyn ContractGateway>,
        gas: GasConfig,
    ) -> Self {
        Self {
            accounts,
            transactions,
            deployments,
            chain,
            contracts,
            gas,
        }
    }

    pub(crate) fn transaction_repository(&self) -> Arc<dyn TransactionRepository> {
        self.transactions.clone()
    }

    pub(crate) fn deployment_repository(&self) -> Arc<dyn DeploymentRepository> {
        self.deployments.clone()
    }

    /// Resolve a gas price: the caller's explicit value, or the gateway
    /// quote with the configured safety multiplier applied.
    async fn resolve_gas_price(
        &self,
        requested: Option<u128>,
        ct: &CancellationToken,
    ) -> CoordinatorResult<u128> {
        match requested {
            Some(price) => Ok(price),
            None => {
                let quoted = with_cancel(ct, self.chain.gas_price()).await?;
                Ok((quoted as f64 * self.gas.price_multiplier) as u128)
            }
        }
    }

    /// Resolve a gas limit: the caller's explicit value, a gateway
    /// estimate, or the given fallback when estimation fails.
    async fn resolve_gas_limit(
        &self,
        requested: Option<u64>,
        from: Address,
        to: Option<Address>,
        amount: U256,
        data: Option<Bytes>,
        fallback: u64,
        ct: &CancellationToken,
    ) -> CoordinatorResult<u64> {
        if let Some(limit) = requested {
            return Ok(limit);
        }
        match with_cancel(ct, self.chain.estimate_gas(from, to, amount, data)).await {
            Ok(units) => Ok(units),
            Err(CoordinatorError::Cancelled) => Err(CoordinatorError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, fallback, "Gas estimation failed, using fallback limit");
                Ok(fallback)
            }
        }
    }
}

/// Race a gateway future against the caller's cancellation token.
pub(crate) async fn with_cancel<T>(
    ct: &CancellationToken,
    fut: impl Future<Output = GatewayResult<T>>,
) -> CoordinatorResult<T> {
    tokio::select! {
        biased;
        _ = ct.cancelled() => Err(CoordinatorError::Cancelled),
        result = fut => result.map_err(CoordinatorError::from),
    }
}

/// Structural check then parse for a textual address.
pub(crate) fn parse_address(field: &'static str, value: &str) -> CoordinatorResult<Address> {
    if !account::is_valid_address(value) {
        return Err(CoordinatorError::validation(
            field,
            format!("not a valid address: {value:?}"),
        ));
    }
    value
        .parse()
        .map_err(|_| CoordinatorError::validation(field, format!("not a valid address: {value:?}")))
}

/// Structural check then parse for a textual transaction hash.
pub(crate) fn parse_hash(field: &'static str, value: &str) -> CoordinatorResult<TxHash> {
    if !transaction::is_valid_hash(value) {
        return Err(CoordinatorError::validation(
            field,
            format!("not a valid transaction hash: {value:?}"),
        ));
    }
    value.parse().map_err(|_| {
        CoordinatorError::validation(field, format!("not a valid transaction hash: {value:?}"))
    })
}

/// Parse caller-supplied signing material.
pub(crate) fn parse_signing_material(private_key: &str) -> CoordinatorResult<SigningMaterial> {
    if private_key.trim().is_empty() {
        return Err(CoordinatorError::validation(
            "private_key",
            "private key must not be empty",
        ));
    }
    SigningMaterial::from_private_key(private_key)
        .map_err(|e| CoordinatorError::validation("private_key", e.to_string()))
}

pub(crate) fn non_empty(field: &'static str, value: &str) -> CoordinatorResult<()> {
    if value.trim().is_empty() {
        return Err(CoordinatorError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// ABI documents must at least be valid JSON before they cross the
/// gateway boundary.
pub(crate) fn validate_abi(abi: &str) -> CoordinatorResult<()> {
    non_empty("abi", abi)?;
    serde_json::from_str::<serde_json::Value>(abi)
        .map(|_| ())
        .map_err(|e| CoordinatorError::validation("abi", format!("not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_rejects_bad_shapes() {
        assert!(parse_address("from_address", "").is_err());
        assert!(parse_address("from_address", "0x12").is_err());
        assert!(parse_address(
            "from_address",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        )
        .is_ok());

        let err = parse_address("to_address", "junk").unwrap_err();
        match err {
            CoordinatorError::Validation { field, .. } => assert_eq!(field, "to_address"),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_parse_hash_rejects_address_length() {
        // an address-shaped string is not a transaction hash
        assert!(parse_hash(
            "transaction_hash",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        )
        .is_err());
        assert!(parse_hash("transaction_hash", &format!("0x{}", "a".repeat(64))).is_ok());
    }

    #[test]
    fn test_validate_abi() {
        assert!(validate_abi("[]").is_ok());
        assert!(validate_abi(r#"[{"type":"function","name":"f"}]"#).is_ok());
        assert!(validate_abi("").is_err());
        assert!(validate_abi("not json").is_err());
    }
}
