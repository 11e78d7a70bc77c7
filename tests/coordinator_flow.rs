//! End-to-end coordinator flows against scripted gateways.

use alloy::primitives::{TxHash, U256};
use tokio_util::sync::CancellationToken;

use web3_service::coordinator::dto::{
    CallContractRequest, DeployContractRequest, SendContractTransactionRequest,
    SubmitTransactionRequest, VerifyContractRequest,
};
use web3_service::error::CoordinatorError;
use web3_service::gateway::AbiValue;
use web3_service::records::{ContractType, DeploymentStatus, TransactionStatus};
use web3_service::repository::{DeploymentRepository, Page, TransactionRepository};

mod common;
use common::{harness, seeded_account, MockChainGateway};

const OTHER_ADDRESS: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const SAMPLE_BYTECODE: &str = "0x6080604052348015600f57600080fd5b50603f80601d6000396000f3fe";

fn transfer_request(from: &str, key: &str, amount: U256) -> SubmitTransactionRequest {
    SubmitTransactionRequest {
        from_address: from.to_string(),
        to_address: OTHER_ADDRESS.to_string(),
        amount,
        gas_price: None,
        gas_limit: None,
        private_key: key.to_string(),
    }
}

#[tokio::test]
async fn test_submit_transaction_records_pending() {
    let h = harness();
    let (from, key, account) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let snapshot = h
        .coordinator
        .submit_transaction(
            transfer_request(&from, &key, U256::from(1_500_000_000_000_000_000u128)),
            &token,
        )
        .await
        .unwrap();

    assert_eq!(snapshot.status, TransactionStatus::Pending);
    assert_ne!(snapshot.hash, TxHash::ZERO);
    assert!(snapshot.gas_used.is_none());
    assert_eq!(snapshot.account_id, account.id);
    // gas was resolved from the gateway quote
    assert_eq!(snapshot.gas_price_wei, h.chain.gas_price);
    assert_eq!(snapshot.gas_limit, h.chain.estimate);

    // the record is findable by hash before any confirmation
    let by_hash = h
        .coordinator
        .transaction_by_hash(&snapshot.hash.to_string())
        .await
        .unwrap();
    assert_eq!(by_hash.id, snapshot.id);
}

#[tokio::test]
async fn test_zero_amount_never_reaches_gateway() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let calls_before = h.chain.total_calls();
    let token = CancellationToken::new();

    let err = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::ZERO), &token)
        .await
        .unwrap_err();

    match err {
        CoordinatorError::Validation { field, .. } => assert_eq!(field, "amount"),
        other => panic!("expected validation error, got {other}"),
    }
    assert_eq!(h.chain.total_calls(), calls_before);
    assert_eq!(
        h.transactions
            .count(&Default::default())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_malformed_addresses_fail_fast() {
    let h = harness();
    let (_, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    for bad in ["", "0x12", "not-an-address", "0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"] {
        let err = h
            .coordinator
            .submit_transaction(transfer_request(bad, &key, U256::from(1u64)), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::Validation { field: "from_address", .. }));
    }
}

#[tokio::test]
async fn test_unknown_sender_is_not_found() {
    let h = harness();
    let token = CancellationToken::new();
    let material = web3_service::gateway::SigningMaterial::random();

    let err = h
        .coordinator
        .submit_transaction(
            transfer_request(
                &material.address().to_string(),
                &material.export_private_key_hex(),
                U256::from(1u64),
            ),
            &token,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound { .. }));
    assert_eq!(h.chain.send_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_deactivated_sender_is_rejected() {
    let h = harness();
    let (from, key, account) = seeded_account(&h).await;
    h.coordinator.deactivate_account(account.id).await.unwrap();
    let token = CancellationToken::new();

    let err = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(1u64)), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotFound { .. }));
}

#[tokio::test]
async fn test_cancellation_before_submission_persists_nothing() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();
    token.cancel();

    let err = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(5u64)), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, CoordinatorError::Cancelled));
    assert_eq!(h.chain.send_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(h.transactions.count(&Default::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_refresh_settles_exactly_once() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let submitted = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(9u64)), &token)
        .await
        .unwrap();

    // no receipt yet: refresh is a no-op
    let still_pending = h
        .coordinator
        .refresh_transaction(submitted.id, &token)
        .await
        .unwrap();
    assert_eq!(still_pending.status, TransactionStatus::Pending);

    h.chain
        .script_receipt(submitted.hash, MockChainGateway::confirmed_receipt(777));

    let confirmed = h
        .coordinator
        .refresh_transaction(submitted.id, &token)
        .await
        .unwrap();
    assert_eq!(confirmed.status, TransactionStatus::Confirmed);
    assert_eq!(confirmed.block_number, Some(777));
    assert_eq!(confirmed.gas_used, Some(21_000));

    // idempotent terminality: a second refresh changes nothing
    let again = h
        .coordinator
        .refresh_transaction(submitted.id, &token)
        .await
        .unwrap();
    assert_eq!(again.status, TransactionStatus::Confirmed);
    assert_eq!(again.updated_at, confirmed.updated_at);
}

#[tokio::test]
async fn test_refresh_marks_reverted_as_failed() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let submitted = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(9u64)), &token)
        .await
        .unwrap();
    h.chain
        .script_receipt(submitted.hash, MockChainGateway::reverted_receipt(778));

    let failed = h
        .coordinator
        .refresh_transaction(submitted.id, &token)
        .await
        .unwrap();
    assert_eq!(failed.status, TransactionStatus::Failed);
    assert!(failed.error_message.is_some());
}

#[tokio::test]
async fn test_cancel_only_from_pending() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let submitted = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(3u64)), &token)
        .await
        .unwrap();

    let cancelled = h
        .coordinator
        .cancel_transaction(submitted.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    let err = h
        .coordinator
        .cancel_transaction(submitted.id)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::StateConflict(_)));
}

#[tokio::test]
async fn test_balance_lookup_needs_no_local_record() {
    let h = harness();
    let token = CancellationToken::new();

    let view = h
        .coordinator
        .account_balance(OTHER_ADDRESS, &token)
        .await
        .unwrap();
    assert_eq!(view.balance_wei, h.chain.balance);
    assert_eq!(h.chain.balance_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_duplicate_import_conflicts() {
    let h = harness();
    let (_, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let err = h.coordinator.import_account(&key, &token).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::StateConflict(_)));
}

fn deploy_request(from: &str, key: &str) -> DeployContractRequest {
    DeployContractRequest {
        contract_name: "BillSettlement".to_string(),
        bytecode: SAMPLE_BYTECODE.to_string(),
        abi: "[]".to_string(),
        contract_type: ContractType::Ledger,
        from_address: from.to_string(),
        private_key: key.to_string(),
        constructor_args: Vec::new(),
        gas_price: None,
        gas_limit: None,
        source_code: None,
    }
}

#[tokio::test]
async fn test_deploy_contract_success() {
    let h = harness();
    let (from, key, account) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let snapshot = h
        .coordinator
        .deploy_contract(deploy_request(&from, &key), &token)
        .await
        .unwrap();

    assert_eq!(snapshot.status, DeploymentStatus::Deployed);
    assert!(snapshot.contract_address.is_some());
    assert_eq!(snapshot.block_number, Some(512));
    assert_eq!(snapshot.gas_used, 1_200_000);
    assert_eq!(snapshot.deployer_account_id, account.id);

    let by_address = h
        .coordinator
        .deployment_by_address(&snapshot.contract_address.unwrap().to_string())
        .await
        .unwrap();
    assert_eq!(by_address.id, snapshot.id);
}

#[tokio::test]
async fn test_deploy_failure_persists_failed_record() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    h.contracts.fail_deploy("insufficient funds for deployment");
    let token = CancellationToken::new();

    let err = h
        .coordinator
        .deploy_contract(deploy_request(&from, &key), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Gateway(_)));

    let records = h
        .deployments
        .list(&Default::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status(), DeploymentStatus::Failed);
    assert!(records[0].contract_address().is_none());
    assert!(records[0]
        .error_message()
        .unwrap()
        .contains("insufficient funds"));
}

#[tokio::test]
async fn test_malformed_bytecode_never_reaches_gateway() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    for bad in ["", "0x", "6080", "0x608g"] {
        let mut request = deploy_request(&from, &key);
        request.bytecode = bad.to_string();
        let err = h
            .coordinator
            .deploy_contract(request, &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::Validation { field: "bytecode", .. }));
    }
    assert_eq!(h.contracts.deploy_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_contract_call_persists_nothing() {
    let h = harness();
    let token = CancellationToken::new();

    let outcome = h
        .coordinator
        .call_contract(
            CallContractRequest {
                contract_address: OTHER_ADDRESS.to_string(),
                abi: "[]".to_string(),
                method_name: "totalSupply".to_string(),
                args: vec![],
            },
            &token,
        )
        .await
        .unwrap();

    assert_eq!(outcome.result, AbiValue::Uint(U256::from(7u64)));
    assert_eq!(h.transactions.count(&Default::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_contract_send_synthesises_pending_record() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let snapshot = h
        .coordinator
        .send_contract_transaction(
            SendContractTransactionRequest {
                contract_address: OTHER_ADDRESS.to_string(),
                abi: "[]".to_string(),
                method_name: "settle".to_string(),
                from_address: from.clone(),
                private_key: key,
                args: vec![AbiValue::from(42u64)],
                gas_price: None,
                gas_limit: None,
                value: None,
            },
            &token,
        )
        .await
        .unwrap();

    assert_eq!(snapshot.status, TransactionStatus::Pending);
    // the contract is the recipient and the amount defaults to zero
    assert_eq!(snapshot.to_address.to_string().to_lowercase(), OTHER_ADDRESS);
    assert_eq!(snapshot.amount_wei, U256::ZERO);
}

#[tokio::test]
async fn test_verify_advances_deployed_record() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    let token = CancellationToken::new();

    let deployed = h
        .coordinator
        .deploy_contract(deploy_request(&from, &key), &token)
        .await
        .unwrap();
    let contract_address = deployed.contract_address.unwrap();

    let verified = h
        .coordinator
        .verify_contract(
            VerifyContractRequest {
                contract_address: contract_address.to_string(),
                source_code: "contract BillSettlement {}".to_string(),
                contract_name: "BillSettlement".to_string(),
                compiler_version: "0.8.24".to_string(),
                optimization_used: true,
                runs: 200,
                constructor_args_encoded: None,
            },
            &token,
        )
        .await
        .unwrap();
    assert!(verified);

    let record = h
        .coordinator
        .deployment_by_address(&contract_address.to_string())
        .await
        .unwrap();
    assert_eq!(record.status, DeploymentStatus::Verified);
}

#[tokio::test]
async fn test_statistics_over_empty_sets_are_zero() {
    let h = harness();

    let tx_stats = h
        .coordinator
        .transaction_statistics(Some(uuid::Uuid::new_v4()), None, None)
        .await
        .unwrap();
    assert_eq!(tx_stats.total_count, 0);
    assert_eq!(tx_stats.total_amount_wei, U256::ZERO);
    assert!(tx_stats.by_status.is_empty());

    let dep_stats = h
        .coordinator
        .deployment_statistics(None, None, None, None)
        .await
        .unwrap();
    assert_eq!(dep_stats.total_count, 0);
}

#[tokio::test]
async fn test_statistics_reflect_filtered_records() {
    let h = harness();
    let (from, key, account) = seeded_account(&h).await;
    let token = CancellationToken::new();

    h.chain.set_next_hash(TxHash::repeat_byte(0x01));
    h.coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(100u64)), &token)
        .await
        .unwrap();
    h.chain.set_next_hash(TxHash::repeat_byte(0x02));
    h.coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(250u64)), &token)
        .await
        .unwrap();

    let stats = h
        .coordinator
        .transaction_statistics(Some(account.id), None, None)
        .await
        .unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.total_amount_wei, U256::from(350u64));
    assert_eq!(stats.by_status.get(&TransactionStatus::Pending), Some(&2));
}

#[tokio::test]
async fn test_account_detail_aggregates() {
    let h = harness();
    let (from, key, account) = seeded_account(&h).await;
    let token = CancellationToken::new();

    h.coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(10u64)), &token)
        .await
        .unwrap();
    h.coordinator
        .deploy_contract(deploy_request(&from, &key), &token)
        .await
        .unwrap();

    let detail = h
        .coordinator
        .account_detail(account.id, &token)
        .await
        .unwrap();
    assert_eq!(detail.transaction_count, 1);
    assert_eq!(detail.deployment_count, 1);
    assert_eq!(detail.balance_wei, h.chain.balance);
}

#[tokio::test]
async fn test_submission_failure_surfaces_gateway_error() {
    let h = harness();
    let (from, key, _) = seeded_account(&h).await;
    *h.chain.fail_send.lock().unwrap() = Some("nonce too low".to_string());
    let token = CancellationToken::new();

    let err = h
        .coordinator
        .submit_transaction(transfer_request(&from, &key, U256::from(1u64)), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Gateway(_)));
    assert!(err.to_string().contains("nonce too low"));
    // no half-written record
    assert_eq!(h.transactions.count(&Default::default()).await.unwrap(), 0);
}
