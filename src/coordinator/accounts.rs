//! Account lifecycle operations.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::coordinator::dto::{AccountDetail, AccountSnapshot, BalanceView};
use crate::coordinator::{parse_address, parse_signing_material, with_cancel, Coordinator};
use crate::error::{CoordinatorError, CoordinatorResult, Resource};
use crate::observability::metrics;
use crate::records::{Account, AccountKind};
use crate::repository::{AccountFilter, DeploymentFilter, Page, TransactionFilter};

impl Coordinator {
    /// Generate and register a fresh account of the given kind.
    pub async fn create_account(
        &self,
        kind: AccountKind,
        ct: &CancellationToken,
    ) -> CoordinatorResult<AccountSnapshot> {
        tracing::info!(kind = ?kind, "Creating account");

        let generated = with_cancel(ct, self.chain.create_account()).await?;
        let account = Account::new(
            generated.address,
            kind,
            generated.public_key,
            generated.key_ref,
        );
        let saved = self.accounts.add(account).await?;

        metrics::record_account_created();
        tracing::info!(account_id = %saved.id(), address = %saved.address(), "Account created");
        Ok(AccountSnapshot::from(&saved))
    }

    /// Register an account derived from existing key material.
    pub async fn import_account(
        &self,
        private_key: &str,
        ct: &CancellationToken,
    ) -> CoordinatorResult<AccountSnapshot> {
        tracing::info!("Importing account from private key");

        let material = parse_signing_material(private_key)?;
        let generated = with_cancel(ct, self.chain.import_account(&material)).await?;

        if self.accounts.exists(generated.address).await? {
            return Err(CoordinatorError::StateConflict(format!(
                "account {} already exists",
                generated.address
            )));
        }

        let account = Account::new(
            generated.address,
            AccountKind::ExternallyOwned,
            generated.public_key,
            generated.key_ref,
        );
        let saved = self.accounts.add(account).await?;

        metrics::record_account_created();
        tracing::info!(account_id = %saved.id(), address = %saved.address(), "Account imported");
        Ok(AccountSnapshot::from(&saved))
    }

    /// Account detail by id, enriched with live balance and aggregate
    /// counts. The balance is best-effort: an unreachable gateway yields
    /// zero rather than failing the lookup.
    pub async fn account_detail(
        &self,
        account_id: Uuid,
        ct: &CancellationToken,
    ) -> CoordinatorResult<AccountDetail> {
        let account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Account, account_id.to_string()))?;
        self.detail_for(account, ct).await
    }

    /// Account detail by address.
    pub async fn account_detail_by_address(
        &self,
        address: &str,
        ct: &CancellationToken,
    ) -> CoordinatorResult<AccountDetail> {
        let address = parse_address("address", address)?;
        let account = self
            .accounts
            .get_by_address(address)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Account, address.to_string()))?;
        self.detail_for(account, ct).await
    }

    async fn detail_for(
        &self,
        account: Account,
        ct: &CancellationToken,
    ) -> CoordinatorResult<AccountDetail> {
        let balance = match with_cancel(ct, self.chain.balance(account.address())).await {
            Ok(balance) => balance,
            Err(CoordinatorError::Cancelled) => return Err(CoordinatorError::Cancelled),
            Err(e) => {
                tracing::warn!(address = %account.address(), error = %e, "Balance lookup failed");
                alloy::primitives::U256::ZERO
            }
        };

        let tx_filter = TransactionFilter {
            account_id: Some(account.id()),
            ..Default::default()
        };
        let dep_filter = DeploymentFilter {
            deployer_account_id: Some(account.id()),
            ..Default::default()
        };
        let transaction_count = self.transactions.count(&tx_filter).await?;
        let deployment_count = self.deployments.count(&dep_filter).await?;

        Ok(AccountDetail {
            account: AccountSnapshot::from(&account),
            balance_wei: balance,
            transaction_count,
            deployment_count,
        })
    }

    /// List accounts, newest first.
    pub async fn list_accounts(
        &self,
        kind: Option<AccountKind>,
        is_active: Option<bool>,
        page: Page,
    ) -> CoordinatorResult<Vec<AccountSnapshot>> {
        let filter = AccountFilter { kind, is_active };
        let accounts = self.accounts.list(&filter, page).await?;
        Ok(accounts.iter().map(AccountSnapshot::from).collect())
    }

    /// Live balance for any well-formed address. Deliberately does not
    /// require a local account record.
    pub async fn account_balance(
        &self,
        address: &str,
        ct: &CancellationToken,
    ) -> CoordinatorResult<BalanceView> {
        let address = parse_address("address", address)?;
        let balance = with_cancel(ct, self.chain.balance(address)).await?;
        Ok(BalanceView {
            address,
            balance_wei: balance,
            queried_at: chrono::Utc::now(),
        })
    }

    /// Soft-deactivate an account. The record is retained.
    pub async fn deactivate_account(&self, account_id: Uuid) -> CoordinatorResult<AccountSnapshot> {
        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Account, account_id.to_string()))?;
        account.deactivate();
        let saved = self.accounts.update(account).await?;

        tracing::info!(account_id = %account_id, "Account deactivated");
        Ok(AccountSnapshot::from(&saved))
    }

    /// Re-activate a previously deactivated account.
    pub async fn activate_account(&self, account_id: Uuid) -> CoordinatorResult<AccountSnapshot> {
        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Account, account_id.to_string()))?;
        account.activate();
        let saved = self.accounts.update(account).await?;

        tracing::info!(account_id = %account_id, "Account activated");
        Ok(AccountSnapshot::from(&saved))
    }
}
