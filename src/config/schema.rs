//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files,
//! and every field has a default so a minimal config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Web3Config {
    /// JSON-RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Gas resolution policy applied when callers omit gas parameters.
    pub gas: GasConfig,

    /// Background reconciliation settings.
    pub reconciler: ReconcilerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Primary RPC endpoint.
    pub rpc_url: String,

    /// Failover endpoints, tried in order after the primary.
    pub failover_urls: Vec<String>,

    /// Expected chain ID; a mismatch is logged at startup.
    pub chain_id: u64,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Block depth required before a transaction counts as confirmed.
    pub confirmation_blocks: u32,

    /// Ceiling on the gas price accepted for submission, in gwei.
    pub max_gas_price_gwei: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 3,
            max_gas_price_gwei: 500,
        }
    }
}

/// Gas resolution policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    /// Safety multiplier applied to gateway-quoted gas prices.
    pub price_multiplier: f64,

    /// Gas limit for plain transfers when estimation fails.
    pub default_transfer_gas_limit: u64,

    /// Gas limit for deployments when estimation fails.
    pub default_deploy_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            price_multiplier: 1.0,
            default_transfer_gas_limit: 21_000,
            default_deploy_gas_limit: 3_000_000,
        }
    }
}

/// Background reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Whether the periodic task runs at all.
    pub enabled: bool,

    /// Sweep interval in milliseconds.
    pub interval_ms: u64,

    /// Minimum age before a pending transaction is re-read from the
    /// network, in seconds.
    pub min_pending_age_secs: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 15_000,
            min_pending_age_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to start the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Listen address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Web3Config::default();
        assert_eq!(config.rpc.rpc_timeout_secs, 10);
        assert_eq!(config.rpc.confirmation_blocks, 3);
        assert_eq!(config.gas.default_deploy_gas_limit, 3_000_000);
        assert!(config.reconciler.enabled);
    }

    #[test]
    fn test_minimal_toml_parses() {
        let config: Web3Config = toml::from_str("").unwrap();
        assert_eq!(config.rpc.rpc_url, "http://localhost:8545");

        let config: Web3Config = toml::from_str(
            r#"
            [rpc]
            rpc_url = "https://rpc.example.org"
            chain_id = 11155111

            [reconciler]
            interval_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc.chain_id, 11155111);
        assert_eq!(config.reconciler.interval_ms, 5000);
        // untouched sections keep defaults
        assert_eq!(config.gas.price_multiplier, 1.0);
    }
}
