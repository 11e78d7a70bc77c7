//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Validation is a
//! pure function and returns every violation, not just the first.

use crate::config::schema::Web3Config;

/// A single configuration violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting all violations.
pub fn validate_config(config: &Web3Config) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let mut issue = |field: &'static str, message: String| {
        issues.push(ValidationIssue { field, message });
    };

    if config.rpc.rpc_url.trim().is_empty() {
        issue("rpc.rpc_url", "must not be empty".into());
    }
    if config.rpc.chain_id == 0 {
        issue("rpc.chain_id", "must be non-zero".into());
    }
    if config.rpc.rpc_timeout_secs == 0 {
        issue("rpc.rpc_timeout_secs", "must be greater than zero".into());
    }
    if config.rpc.max_gas_price_gwei == 0 {
        issue("rpc.max_gas_price_gwei", "must be greater than zero".into());
    }

    if config.gas.price_multiplier < 1.0 {
        issue(
            "gas.price_multiplier",
            format!("must be at least 1.0, got {}", config.gas.price_multiplier),
        );
    }
    if config.gas.default_transfer_gas_limit == 0 {
        issue(
            "gas.default_transfer_gas_limit",
            "must be greater than zero".into(),
        );
    }
    if config.gas.default_deploy_gas_limit == 0 {
        issue(
            "gas.default_deploy_gas_limit",
            "must be greater than zero".into(),
        );
    }

    if config.reconciler.enabled && config.reconciler.interval_ms == 0 {
        issue(
            "reconciler.interval_ms",
            "must be greater than zero when the reconciler is enabled".into(),
        );
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        issue(
            "observability.metrics_address",
            format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        );
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
