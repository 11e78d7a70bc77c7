//! Background reconciliation.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → list_pending() transactions past the minimum age
//!     → list_unsettled() deployments
//!     → re-read receipts through the coordinator's refresh paths
//!     → records repaired to their terminal states
//! ```
//!
//! Closes the gap between local `Pending` records and on-chain reality
//! when no caller ever drives the explicit refresh path. Per-record
//! failures are logged and retried on the next sweep, never fatal to the
//! task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::ReconcilerConfig;
use crate::coordinator::Coordinator;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::observability::metrics;

/// Outcome of a single sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub transactions_examined: usize,
    pub transactions_settled: usize,
    pub deployments_examined: usize,
    pub deployments_settled: usize,
}

/// Periodic task repairing stale records from network receipts.
pub struct Reconciler {
    coordinator: Arc<Coordinator>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(coordinator: Arc<Coordinator>, config: ReconcilerConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Run until the token fires.
    pub async fn run(self, token: CancellationToken) {
        if !self.config.enabled {
            tracing::info!("Reconciler disabled");
            return;
        }

        let interval = Duration::from_millis(self.config.interval_ms);
        tracing::info!(
            interval_ms = self.config.interval_ms,
            min_pending_age_secs = self.config.min_pending_age_secs,
            "Reconciler started"
        );

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Reconciler stopped");
                    return;
                }
                _ = sleep(interval) => {}
            }

            match self.sweep(&token).await {
                Ok(summary) => {
                    if summary.transactions_settled > 0 || summary.deployments_settled > 0 {
                        tracing::info!(
                            transactions = summary.transactions_settled,
                            deployments = summary.deployments_settled,
                            "Reconciler repaired records"
                        );
                    }
                }
                Err(CoordinatorError::Cancelled) => {
                    tracing::info!("Reconciler stopped mid-sweep");
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reconciler sweep failed");
                }
            }
        }
    }

    /// One pass over stale pending transactions and unsettled
    /// deployments. Public so tests and embedding services can drive it
    /// directly.
    pub async fn sweep(&self, token: &CancellationToken) -> CoordinatorResult<SweepSummary> {
        let mut summary = SweepSummary::default();
        let cutoff =
            Utc::now() - chrono::Duration::seconds(self.config.min_pending_age_secs as i64);

        let pending = self
            .coordinator
            .transaction_repository()
            .list_pending()
            .await?;
        for tx in pending.iter().filter(|tx| tx.created_at() <= cutoff) {
            summary.transactions_examined += 1;
            match self.coordinator.refresh_transaction(tx.id(), token).await {
                Ok(snapshot) if snapshot.status.is_terminal() => {
                    summary.transactions_settled += 1;
                    metrics::record_reconciler_repair();
                }
                Ok(_) => {}
                Err(CoordinatorError::Cancelled) => return Err(CoordinatorError::Cancelled),
                Err(e) => {
                    tracing::warn!(tx_hash = %tx.hash(), error = %e, "Left for next sweep");
                }
            }
        }

        let unsettled = self
            .coordinator
            .deployment_repository()
            .list_unsettled()
            .await?;
        for dep in &unsettled {
            summary.deployments_examined += 1;
            match self.coordinator.refresh_deployment(dep.id(), token).await {
                Ok(snapshot) if !snapshot.status.is_unsettled() => {
                    summary.deployments_settled += 1;
                    metrics::record_reconciler_repair();
                }
                Ok(_) => {}
                Err(CoordinatorError::Cancelled) => return Err(CoordinatorError::Cancelled),
                Err(e) => {
                    tracing::warn!(deployment_id = %dep.id(), error = %e, "Left for next sweep");
                }
            }
        }

        Ok(summary)
    }
}
