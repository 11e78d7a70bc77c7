//! Read-only statistics.
//!
//! Pure aggregation over the repositories' filtered count/sum
//! operations; no business logic beyond assembling the response shape.
//! Empty filtered sets yield zeros, never errors.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::coordinator::dto::{DeploymentStats, TransactionStats};
use crate::coordinator::Coordinator;
use crate::error::CoordinatorResult;
use crate::records::ContractType;
use crate::repository::{DeploymentFilter, TransactionFilter};

impl Coordinator {
    /// Transaction count, exact total amount and per-status breakdown.
    pub async fn transaction_statistics(
        &self,
        account_id: Option<Uuid>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> CoordinatorResult<TransactionStats> {
        let filter = TransactionFilter {
            account_id,
            from_date,
            to_date,
            ..Default::default()
        };

        let total_count = self.transactions.count(&filter).await?;
        let total_amount_wei = self.transactions.sum_amount(&filter).await?;
        let by_status = self.transactions.count_by_status(&filter).await?;

        Ok(TransactionStats {
            account_id,
            total_count,
            total_amount_wei,
            by_status,
            from_date,
            to_date,
        })
    }

    /// Deployment count grouped by status.
    pub async fn deployment_statistics(
        &self,
        deployer_account_id: Option<Uuid>,
        contract_type: Option<ContractType>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> CoordinatorResult<DeploymentStats> {
        let filter = DeploymentFilter {
            deployer_account_id,
            contract_type,
            from_date,
            to_date,
            ..Default::default()
        };

        let total_count = self.deployments.count(&filter).await?;
        let by_status = self.deployments.count_by_status(&filter).await?;

        Ok(DeploymentStats {
            deployer_account_id,
            total_count,
            by_status,
        })
    }
}
