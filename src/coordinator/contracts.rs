//! Contract deployment and invocation operations.

use alloy::primitives::{Bytes, U256};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::coordinator::dto::{
    CallContractRequest, CallOutcome, ContractEventsRequest, DeployContractRequest,
    DeploymentSnapshot, ListDeploymentsRequest, SendContractTransactionRequest,
    TransactionSnapshot, VerifyContractRequest,
};
use crate::coordinator::{
    non_empty, parse_address, parse_hash, parse_signing_material, validate_abi, with_cancel,
    Coordinator,
};
use crate::error::{CoordinatorError, CoordinatorResult, Resource};
use crate::gateway::{ContractCall, ContractEvent, ContractSend, DeployRequest, EventQuery, VerifyRequest};
use crate::observability::metrics;
use crate::records::{deployment, DeploymentRecord, DeploymentStatus, TransactionRecord};
use crate::repository::{DeploymentFilter, Page};

impl Coordinator {
    /// Deploy a contract.
    ///
    /// Exactly one record is persisted per outcome: `Deployed` with
    /// block, cost and gas populated on success, `Failed` with the
    /// gateway's message otherwise. A gateway failure is still surfaced
    /// to the caller after the `Failed` record is written.
    pub async fn deploy_contract(
        &self,
        request: DeployContractRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<DeploymentSnapshot> {
        non_empty("contract_name", &request.contract_name)?;
        let from = parse_address("from_address", &request.from_address)?;
        if !deployment::is_well_formed_bytecode(&request.bytecode) {
            return Err(CoordinatorError::validation(
                "bytecode",
                "bytecode must be 0x-prefixed hex",
            ));
        }
        validate_abi(&request.abi)?;
        let signer = parse_signing_material(&request.private_key)?;

        let bytecode: Bytes = request.bytecode.parse().map_err(|_| {
            CoordinatorError::validation("bytecode", "bytecode must be 0x-prefixed hex")
        })?;

        let deployer = self
            .accounts
            .get_by_address(from)
            .await?
            .filter(|a| a.is_active())
            .ok_or_else(|| {
                CoordinatorError::not_found(Resource::Account, request.from_address.clone())
            })?;

        tracing::info!(
            contract_name = %request.contract_name,
            deployer = %from,
            "Deploying contract"
        );

        let gas_price = self.resolve_gas_price(request.gas_price, ct).await?;
        let gas_limit = self
            .resolve_gas_limit(
                request.gas_limit,
                from,
                None,
                U256::ZERO,
                Some(bytecode.clone()),
                self.gas.default_deploy_gas_limit,
                ct,
            )
            .await?;

        let deploy = DeployRequest {
            contract_name: request.contract_name.clone(),
            bytecode: bytecode.clone(),
            abi: request.abi.clone(),
            deployer: from,
            signer,
            constructor_args: request.constructor_args.clone(),
            gas_price,
            gas_limit,
        };

        let mut record = DeploymentRecord::new(
            request.contract_name.clone(),
            bytecode,
            request.contract_type,
            deployer.id(),
            Some(request.abi.clone()),
            request.source_code.clone(),
        );

        match with_cancel(ct, self.contracts.deploy(&deploy)).await {
            Ok(outcome) => {
                record
                    .mark_deployed(
                        outcome.contract_address,
                        outcome.transaction_hash,
                        outcome.block_number,
                        outcome.cost,
                        outcome.gas_used,
                    )
                    .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
                let saved = self.deployments.add(record).await.map_err(|e| {
                    CoordinatorError::Persistence(format!(
                        "contract {} deployed at {} but the local record could not be written: {e}",
                        request.contract_name, outcome.contract_address
                    ))
                })?;

                metrics::record_deployment("deployed");
                tracing::info!(
                    contract_name = %request.contract_name,
                    contract_address = %outcome.contract_address,
                    block = outcome.block_number,
                    "Contract deployed"
                );
                Ok(DeploymentSnapshot::from(&saved))
            }
            Err(CoordinatorError::Cancelled) => Err(CoordinatorError::Cancelled),
            Err(CoordinatorError::Gateway(e)) => {
                record
                    .mark_failed(e.to_string())
                    .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
                self.deployments.add(record).await?;

                metrics::record_deployment("failed");
                tracing::error!(
                    contract_name = %request.contract_name,
                    error = %e,
                    "Contract deployment failed"
                );
                Err(CoordinatorError::Gateway(e))
            }
            Err(other) => Err(other),
        }
    }

    pub async fn deployment(&self, deployment_id: Uuid) -> CoordinatorResult<DeploymentSnapshot> {
        let record = self.deployments.get(deployment_id).await?.ok_or_else(|| {
            CoordinatorError::not_found(Resource::Deployment, deployment_id.to_string())
        })?;
        Ok(DeploymentSnapshot::from(&record))
    }

    pub async fn deployment_by_address(
        &self,
        contract_address: &str,
    ) -> CoordinatorResult<DeploymentSnapshot> {
        let address = parse_address("contract_address", contract_address)?;
        let record = self
            .deployments
            .get_by_contract_address(address)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Deployment, address.to_string()))?;
        Ok(DeploymentSnapshot::from(&record))
    }

    pub async fn deployment_by_transaction_hash(
        &self,
        hash: &str,
    ) -> CoordinatorResult<DeploymentSnapshot> {
        let hash = parse_hash("transaction_hash", hash)?;
        let record = self
            .deployments
            .get_by_transaction_hash(hash)
            .await?
            .ok_or_else(|| CoordinatorError::not_found(Resource::Deployment, hash.to_string()))?;
        Ok(DeploymentSnapshot::from(&record))
    }

    /// List deployment records, newest first.
    pub async fn list_deployments(
        &self,
        request: ListDeploymentsRequest,
    ) -> CoordinatorResult<Vec<DeploymentSnapshot>> {
        let filter = DeploymentFilter {
            deployer_account_id: request.deployer_account_id,
            contract_type: request.contract_type,
            status: request.status,
            from_date: request.from_date,
            to_date: request.to_date,
        };
        let page = Page {
            skip: request.skip.unwrap_or(0),
            take: request.take.unwrap_or(Page::default().take),
        };
        let records = self.deployments.list(&filter, page).await?;
        Ok(records.iter().map(DeploymentSnapshot::from).collect())
    }

    /// Read-only contract call. Nothing is submitted or persisted.
    pub async fn call_contract(
        &self,
        request: CallContractRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<CallOutcome> {
        let contract_address = parse_address("contract_address", &request.contract_address)?;
        validate_abi(&request.abi)?;
        non_empty("method_name", &request.method_name)?;

        let call = ContractCall {
            contract_address,
            abi: request.abi,
            method: request.method_name.clone(),
            args: request.args,
        };
        let result = with_cancel(ct, self.contracts.call(&call)).await?;

        Ok(CallOutcome {
            contract_address,
            method_name: request.method_name,
            result,
        })
    }

    /// State-changing contract invocation. On success a `Pending`
    /// transaction record is synthesised with the contract as `to`;
    /// the amount defaults to zero unless a value is attached.
    pub async fn send_contract_transaction(
        &self,
        request: SendContractTransactionRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<TransactionSnapshot> {
        let contract_address = parse_address("contract_address", &request.contract_address)?;
        validate_abi(&request.abi)?;
        non_empty("method_name", &request.method_name)?;
        let from = parse_address("from_address", &request.from_address)?;
        let signer = parse_signing_material(&request.private_key)?;
        let value = request.value.unwrap_or(U256::ZERO);

        let account = self
            .accounts
            .get_by_address(from)
            .await?
            .filter(|a| a.is_active())
            .ok_or_else(|| {
                CoordinatorError::not_found(Resource::Account, request.from_address.clone())
            })?;

        tracing::info!(
            contract_address = %contract_address,
            method = %request.method_name,
            from = %from,
            "Sending contract transaction"
        );

        let gas_price = self.resolve_gas_price(request.gas_price, ct).await?;
        let gas_limit = self
            .resolve_gas_limit(
                request.gas_limit,
                from,
                Some(contract_address),
                value,
                None,
                self.gas.default_transfer_gas_limit,
                ct,
            )
            .await?;

        let send = ContractSend {
            contract_address,
            abi: request.abi,
            method: request.method_name.clone(),
            from,
            signer,
            args: request.args,
            gas_price,
            gas_limit,
            value,
        };
        let hash = with_cancel(ct, self.contracts.send(&send)).await?;

        let record = TransactionRecord::new(
            hash,
            from,
            contract_address,
            value,
            gas_price,
            gas_limit,
            account.id(),
            None,
        );
        let saved = self.transactions.add(record).await.map_err(|e| {
            CoordinatorError::Persistence(format!(
                "contract transaction {hash} was submitted on-chain but the local record could not be written: {e}"
            ))
        })?;

        metrics::record_transaction_submitted();
        tracing::info!(tx_hash = %hash, "Contract transaction recorded");
        Ok(TransactionSnapshot::from(&saved))
    }

    /// Re-read the deployment transaction's receipt and settle an
    /// unsettled record. Settled records are returned unchanged; a
    /// record that never reached the network has nothing to read back.
    pub async fn refresh_deployment(
        &self,
        deployment_id: Uuid,
        ct: &CancellationToken,
    ) -> CoordinatorResult<DeploymentSnapshot> {
        let mut record = self.deployments.get(deployment_id).await?.ok_or_else(|| {
            CoordinatorError::not_found(Resource::Deployment, deployment_id.to_string())
        })?;

        if !record.status().is_unsettled() {
            return Ok(DeploymentSnapshot::from(&record));
        }
        let Some(hash) = record.transaction_hash() else {
            return Ok(DeploymentSnapshot::from(&record));
        };
        let Some(receipt) = with_cancel(ct, self.chain.receipt(hash)).await? else {
            tracing::debug!(tx_hash = %hash, "Deployment transaction still pending");
            return Ok(DeploymentSnapshot::from(&record));
        };

        if receipt.succeeded {
            let Some(contract_address) = receipt.contract_address else {
                tracing::warn!(
                    tx_hash = %hash,
                    "Receipt carries no contract address, leaving record unsettled"
                );
                return Ok(DeploymentSnapshot::from(&record));
            };
            record
                .mark_deployed(
                    contract_address,
                    hash,
                    receipt.block_number.unwrap_or_default(),
                    receipt.cost(),
                    receipt.gas_used,
                )
                .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
            metrics::record_deployment("deployed");
        } else {
            record
                .mark_failed("deployment transaction reverted on-chain")
                .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
            metrics::record_deployment("failed");
        }

        let saved = self.deployments.update(record).await?;
        tracing::info!(
            deployment_id = %deployment_id,
            status = %saved.status(),
            "Deployment settled"
        );
        Ok(DeploymentSnapshot::from(&saved))
    }

    /// Historical event query, delegated to the contract gateway.
    pub async fn contract_events(
        &self,
        request: ContractEventsRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<Vec<ContractEvent>> {
        let contract_address = parse_address("contract_address", &request.contract_address)?;
        validate_abi(&request.abi)?;
        non_empty("event_name", &request.event_name)?;

        let query = EventQuery {
            contract_address,
            abi: request.abi,
            event_name: request.event_name,
            from_block: request.from_block,
            to_block: request.to_block,
        };
        with_cancel(ct, self.contracts.events(&query)).await
    }

    /// Source verification. On success a locally known `Deployed` record
    /// advances to `Verified`.
    pub async fn verify_contract(
        &self,
        request: VerifyContractRequest,
        ct: &CancellationToken,
    ) -> CoordinatorResult<bool> {
        let contract_address = parse_address("contract_address", &request.contract_address)?;
        non_empty("source_code", &request.source_code)?;
        non_empty("contract_name", &request.contract_name)?;

        let verify = VerifyRequest {
            contract_address,
            source_code: request.source_code,
            contract_name: request.contract_name,
            compiler_version: request.compiler_version,
            optimization: request.optimization_used,
            runs: request.runs,
            constructor_args_encoded: request.constructor_args_encoded,
        };
        let verified = with_cancel(ct, self.contracts.verify(&verify)).await?;

        if verified {
            if let Some(mut record) = self
                .deployments
                .get_by_contract_address(contract_address)
                .await?
            {
                if record.status() == DeploymentStatus::Deployed {
                    record
                        .mark_verified()
                        .map_err(|e| CoordinatorError::StateConflict(e.to_string()))?;
                    self.deployments.update(record).await?;
                    tracing::info!(
                        contract_address = %contract_address,
                        "Deployment marked verified"
                    );
                }
            }
        }

        Ok(verified)
    }
}
