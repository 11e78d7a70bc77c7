//! Metrics collection and exposition.
//!
//! # Metrics
//! - `web3_transactions_submitted_total` (counter)
//! - `web3_transactions_settled_total` (counter, by terminal status)
//! - `web3_deployments_total` (counter, by outcome)
//! - `web3_accounts_created_total` (counter)
//! - `web3_reconciler_repairs_total` (counter)
//! - `web3_gateway_up` (gauge): 1=reachable, 0=unreachable

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address.
///
/// Failure to bind is logged, not fatal; the service runs without
/// exposition.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }
}

pub fn record_account_created() {
    metrics::counter!("web3_accounts_created_total").increment(1);
}

pub fn record_transaction_submitted() {
    metrics::counter!("web3_transactions_submitted_total").increment(1);
}

/// `status` is the terminal status the record settled into.
pub fn record_transaction_settled(status: &'static str) {
    metrics::counter!("web3_transactions_settled_total", "status" => status).increment(1);
}

/// `outcome` is "deployed" or "failed".
pub fn record_deployment(outcome: &'static str) {
    metrics::counter!("web3_deployments_total", "outcome" => outcome).increment(1);
}

pub fn record_reconciler_repair() {
    metrics::counter!("web3_reconciler_repairs_total").increment(1);
}

pub fn record_gateway_health(healthy: bool) {
    metrics::gauge!("web3_gateway_up").set(if healthy { 1.0 } else { 0.0 });
}
