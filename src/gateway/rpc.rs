//! Alloy-backed blockchain gateway.
//!
//! # Responsibilities
//! - Connect to the configured JSON-RPC endpoint plus failovers
//! - Query chain state (balances, gas price, receipts, block number)
//! - Sign and submit value transfers
//! - Enforce the configured gas-price ceiling before submission

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::schema::RpcConfig;
use crate::gateway::{
    BlockchainGateway, GatewayError, GatewayResult, GeneratedAccount, OnChainReceipt,
    SigningMaterial, TransferRequest,
};
use crate::observability::metrics;

/// Blockchain gateway over JSON-RPC with failover support.
#[derive(Clone)]
pub struct RpcBlockchainGateway {
    /// Read providers (primary + failovers), tried in order.
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// The primary endpoint, reused to build per-request signing
    /// providers.
    primary_url: Url,
    config: RpcConfig,
    timeout_duration: Duration,
}

impl RpcBlockchainGateway {
    /// Connect to the configured endpoints.
    ///
    /// Initialisation succeeds even when the chain is unreachable; a
    /// chain-id mismatch is logged, not fatal, so the service can start
    /// while the network is degraded.
    pub async fn new(config: RpcConfig) -> GatewayResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: Url = config.rpc_url.parse().map_err(|e| {
            GatewayError::Rpc(format!("invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url.clone()))
            as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse::<Url>() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let gateway = Self {
            providers,
            primary_url,
            config: config.clone(),
            timeout_duration,
        };

        match gateway.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Blockchain gateway initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain gateway initialized but chain verification failed"
                );
            }
        }

        Ok(gateway)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> GatewayResult<()> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(chain_id)) => {
                    if chain_id != self.config.chain_id {
                        return Err(GatewayError::InvalidResponse(format!(
                            "chain id mismatch: expected {}, got {}",
                            self.config.chain_id, chain_id
                        )));
                    }
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(GatewayError::Rpc(
            "all RPC providers failed to get chain id".to_string(),
        ))
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }

    fn check_gas_ceiling(&self, gas_price: u128) -> GatewayResult<()> {
        let gas_price_gwei = gas_price / 1_000_000_000;
        if gas_price_gwei > self.config.max_gas_price_gwei as u128 {
            return Err(GatewayError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.config.max_gas_price_gwei,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlockchainGateway for RpcBlockchainGateway {
    async fn create_account(&self) -> GatewayResult<GeneratedAccount> {
        let material = SigningMaterial::random();
        Ok(GeneratedAccount {
            address: material.address(),
            public_key: Some(material.public_key_hex()),
            key_ref: Some(material.export_private_key_hex()),
        })
    }

    async fn import_account(&self, signer: &SigningMaterial) -> GatewayResult<GeneratedAccount> {
        Ok(GeneratedAccount {
            address: signer.address(),
            public_key: Some(signer.public_key_hex()),
            key_ref: Some(signer.export_private_key_hex()),
        })
    }

    async fn balance(&self, address: Address) -> GatewayResult<U256> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_balance(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(balance)) => return Ok(balance),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(GatewayError::Rpc(
            "all providers failed to get balance".to_string(),
        ))
    }

    async fn send_transaction(&self, request: &TransferRequest) -> GatewayResult<TxHash> {
        if request.signer.address() != request.from {
            return Err(GatewayError::Wallet(format!(
                "signing key controls {}, not the requested from address {}",
                request.signer.address(),
                request.from
            )));
        }
        self.check_gas_ceiling(request.gas_price)?;

        let wallet = EthereumWallet::from(request.signer.signer());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.primary_url.clone());

        let mut tx = TransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_value(request.amount)
            .with_gas_price(request.gas_price)
            .with_gas_limit(request.gas_limit)
            .with_chain_id(self.config.chain_id);
        if let Some(data) = &request.data {
            tx = tx.with_input(data.clone());
        }

        let pending = timeout(self.timeout_duration, provider.send_transaction(tx))
            .await
            .map_err(|_| GatewayError::Timeout(self.config.rpc_timeout_secs))?
            .map_err(|e| GatewayError::Rpc(e.to_string()))?;

        let hash = *pending.tx_hash();
        tracing::info!(tx_hash = %hash, "Transaction submitted");
        Ok(hash)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Option<Address>,
        amount: U256,
        data: Option<Bytes>,
    ) -> GatewayResult<u64> {
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_value(amount);
        if let Some(to) = to {
            tx = tx.with_to(to);
        }
        if let Some(data) = data {
            tx = tx.with_input(data);
        }

        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.estimate_gas(tx.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(units)) => return Ok(units),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(GatewayError::Rpc(
            "all providers failed to estimate gas".to_string(),
        ))
    }

    async fn gas_price(&self) -> GatewayResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(price)) => return Ok(price),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(GatewayError::Rpc(
            "all providers failed to get gas price".to_string(),
        ))
    }

    async fn receipt(&self, hash: TxHash) -> GatewayResult<Option<OnChainReceipt>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(receipt)) => {
                    return Ok(receipt.map(|r| OnChainReceipt {
                        succeeded: r.status(),
                        block_number: r.block_number,
                        block_hash: r.block_hash,
                        transaction_index: r.transaction_index,
                        gas_used: r.gas_used,
                        effective_gas_price: r.effective_gas_price,
                        contract_address: r.contract_address,
                    }))
                }
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(GatewayError::Rpc(
            "all providers failed to get receipt".to_string(),
        ))
    }

    async fn block_number(&self) -> GatewayResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(number)) => return Ok(number),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(GatewayError::Rpc(
            "all providers failed to get block number".to_string(),
        ))
    }

    async fn is_connected(&self) -> bool {
        let connected = self.block_number().await.is_ok();
        metrics::record_gateway_health(connected);
        connected
    }
}

impl std::fmt::Debug for RpcBlockchainGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcBlockchainGateway")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
