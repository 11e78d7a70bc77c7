//! Transaction submission and lifecycle operations.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::coordinator::dto::{
    EstimateGasRequest, GasEstimate, ListTransactionsRequest, NetworkStatus,
    SubmitTransactionRequest, TransactionSnapshot,
};
use crate::coordinator::{parse_address, parse_hash, parse_signing_material, with_cancel, Coordinator};
use crate::error::{CoordinatorError, CoordinatorResult, Resource};
use crate::gateway::TransferRequest;
use crate::observability::metrics;
use crate::records::TransactionRecord;
use crate::repository::{Page, TransactionFilter};

impl Coordinator {
    /// Submit a value transfer.
    ///
    /// Validation happens strictly before any gateway call. On a
    /// successful submission the `Pending` record is written at most
    /// once; if that write fails the hash still exists on-chain, which is
    /// surfaced as a distinct [`CoordinatorError::Persistence`] so an
    /// out-of-band pass can repair it.
    pub async fn submit_transaction(
        &self,
        request: SubmitTransactionRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<TransactionSnapshot> {
        let from = parse_address("from_address", &request.from_address)?;
        let to = parse_address("to_address", &request.to_address)?;
        if request.amount.is_zero() {
            return Err(CoordinatorError::validation(
                "amount",
                "amount must be greater than zero",
            ));
        }
        if request.gas_limit == Some(0) {
            return Err(CoordinatorError::validation(
                "gas_limit",
                "gas limit must be greater than zero",
            ));
        }
        let signer = parse_signing_material(&request.private_key)?;

        let account = self
            .accounts
            .get_by_address(from)
            .await?
            .filter(|a| a.is_active())
            .ok_or_else(|| {
                CoordinatorError::not_found(Resource::Account, request.from_address.clone())
            })?;

        tracing::info!(
            from = %from,
            to = %to,
            amount_wei = %request.amount,
            "Submitting transaction"
        );

        let gas_price = self.resolve_gas_price(request.gas_price, ct).await?;
        let gas_limit = self
            .resolve_gas_limit(
                request.gas_limit,
                from,
                Some(to),
                request.amount,
                None,
                self.gas.default_transfer_gas_limit,
                ct,
            )
            .await?;

        let transfer = TransferRequest {
            from,
            to,
            amount: request.amount,
            gas_price,
            gas_limit,
            signer,
            data: None,
        };
        let hash = with_cancel(ct, self.chain.send_transaction(&transfer)).await?;

        let record = TransactionRecord::new(
            hash,
            from,
            to,
            request.amount,
            gas_price,
            gas_limit,
            account.id(),
            None,
        );
        let saved = self.transactions.add(record).await.map_err(|e| {
            CoordinatorError::Persistence(format!(
                "transaction {hash} was submitted on-chain but the local record could not be written: {e}"
            ))
        })?;

        metrics::record_transaction_submitted();
        tracing::info!(tx_hash = %hash, transaction_id = %saved.id(), "Transaction recorded");
        Ok(TransactionSnapshot::from(&saved))
    }

    pub async fn transaction(&self, transaction_id: Uuid) -> CoordinatorResult<TransactionSnapshot> {
        let record = self.transactions.get(transaction_id).await?.ok_or_else(|| {
            CoordinatorError::not_found(Resource::Transaction, transaction_id.to_string())
        })?;
        Ok(TransactionSnapshot::from(&record))
    }

    /// Lookup by hash; available from submission time onwards.
    pub async fn transaction_by_hash(&self, hash: &str) -> CoordinatorResult<TransactionSnapshot> {
        let hash = parse_hash("transaction_hash", hash)?;
        let record = self
            .transactions
            .get_by_hash(hash)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Transaction, hash.to_string()))?;
        Ok(TransactionSnapshot::from(&record))
    }

    /// List transaction records, newest first.
    pub async fn list_transactions(
        &self,
        request: ListTransactionsRequest,
    ) -> CoordinatorResult<Vec<TransactionSnapshot>> {
        let from_address = request
            .from_address
            .as_deref()
            .map(|a| parse_address("from_address", a))
            .transpose()?;
        let to_address = request
            .to_address
            .as_deref()
            .map(|a| parse_address("to_address", a))
            .transpose()?;

        let filter = TransactionFilter {
            account_id: request.account_id,
            from_address,
            to_address,
            status: request.status,
            from_date: request.from_date,
            to_date: request.to_date,
        };
        let page = Page {
            skip: request.skip.unwrap_or(0),
            take: request.take.unwrap_or(Page::default().take),
        };
        let records = self.transactions.list(&filter, page).await?;
        Ok(records.iter().map(TransactionSnapshot::from).collect())
    }

    /// Status-refresh path: re-read the receipt and settle the record.
    ///
    /// A record already in a terminal state is returned unchanged; a
    /// still-unmined transaction stays `Pending`. Both the explicit
    /// caller path and the background reconciler funnel through here, so
    /// the terminal transition is applied exactly once.
    pub async fn refresh_transaction(
        &self,
        transaction_id: Uuid,
        ct: &CancellationToken,
    ) -> CoordinatorResult<TransactionSnapshot> {
        let mut record = self.transactions.get(transaction_id).await?.ok_or_else(|| {
            CoordinatorError::not_found(Resource::Transaction, transaction_id.to_string())
        })?;

        if record.status().is_terminal() {
            return Ok(TransactionSnapshot::from(&record));
        }

        let Some(receipt) = with_cancel(ct, self.chain.receipt(record.hash())).await? else {
            tracing::debug!(tx_hash = %record.hash(), "Transaction still pending");
            return Ok(TransactionSnapshot::from(&record));
        };

        if receipt.succeeded {
            record
                .mark_confirmed(
                    receipt.block_number.unwrap_or_default(),
                    receipt.block_hash.unwrap_or_default(),
                    receipt.transaction_index.unwrap_or_default(),
                    receipt.gas_used,
                    receipt.contract_address,
                )
                .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
            metrics::record_transaction_settled("confirmed");
        } else {
            record
                .mark_failed("execution reverted on-chain")
                .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
            metrics::record_transaction_settled("failed");
        }

        let saved = self.transactions.update(record).await?;
        tracing::info!(
            tx_hash = %saved.hash(),
            status = %saved.status(),
            block = ?saved.block_number(),
            "Transaction settled"
        );
        Ok(TransactionSnapshot::from(&saved))
    }

    /// Explicit administrative cancellation of a still-pending record.
    ///
    /// Never entered automatically: once the network has seen a
    /// transaction it cannot be locally cancelled, and a settled record
    /// rejects the transition.
    pub async fn cancel_transaction(
        &self,
        transaction_id: Uuid,
    ) -> CoordinatorResult<TransactionSnapshot> {
        let mut record = self.transactions.get(transaction_id).await?.ok_or_else(|| {
            CoordinatorError::not_found(Resource::Transaction, transaction_id.to_string())
        })?;

        record
            .mark_cancelled()
            .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
        let saved = self.transactions.update(record).await?;

        metrics::record_transaction_settled("cancelled");
        tracing::info!(transaction_id = %transaction_id, "Transaction cancelled");
        Ok(TransactionSnapshot::from(&saved))
    }

    /// Pure read-through gas estimation; mutates nothing.
    pub async fn estimate_gas(
        &self,
        request: EstimateGasRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<GasEstimate> {
        let from = parse_address("from_address", &request.from_address)?;
        let to = parse_address("to_address", &request.to_address)?;
        if request.amount.is_zero() && request.data.is_none() {
            return Err(CoordinatorError::validation(
                "amount",
                "amount must be greater than zero for a plain transfer",
            ));
        }

        let gas_units = with_cancel(
            ct,
            self.chain
                .estimate_gas(from, Some(to), request.amount, request.data.clone()),
        )
        .await?;
        Ok(GasEstimate { gas_units })
    }

    /// Current gateway gas quote in wei, multiplier not applied.
    pub async fn gas_price(&self, ct: &CancellationToken) -> CoordinatorResult<u128> {
        with_cancel(ct, self.chain.gas_price()).await
    }

    /// Network reachability plus the latest block when reachable.
    pub async fn network_status(&self, ct: &CancellationToken) -> CoordinatorResult<NetworkStatus> {
        if ct.is_cancelled() {
            return Err(CoordinatorError::Cancelled);
        }
        let connected = self.chain.is_connected().await;
        let block_number = if connected {
            self.chain.block_number().await.ok()
        } else {
            None
        };
        Ok(NetworkStatus {
            connected,
            block_number,
        })
    }
}
