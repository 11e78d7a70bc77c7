//! Shared test harness: scripted gateways and a wired coordinator.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use web3_service::config::GasConfig;
use web3_service::coordinator::dto::AccountSnapshot;
use web3_service::coordinator::Coordinator;
use web3_service::gateway::{
    AbiValue, BlockchainGateway, ContractCall, ContractEvent, ContractGateway, ContractSend,
    DeployOutcome, DeployRequest, EventQuery, GatewayError, GatewayResult, GeneratedAccount,
    OnChainReceipt, SigningMaterial, TransferRequest, VerifyRequest,
};
use web3_service::repository::{
    AccountRepository, DeploymentRepository, InMemoryAccountRepository,
    InMemoryDeploymentRepository, InMemoryTransactionRepository, TransactionRepository,
};

/// Scripted blockchain gateway counting every call it observes.
pub struct MockChainGateway {
    pub gas_price: u128,
    pub estimate: u64,
    pub balance: U256,
    pub next_hash: Mutex<TxHash>,
    pub receipts: Mutex<HashMap<TxHash, OnChainReceipt>>,
    /// When set, `send_transaction` fails with this message.
    pub fail_send: Mutex<Option<String>>,
    /// Total gateway calls of any kind.
    pub calls: AtomicU32,
    pub send_calls: AtomicU32,
    pub balance_calls: AtomicU32,
}

impl Default for MockChainGateway {
    fn default() -> Self {
        Self {
            gas_price: 20_000_000_000,
            estimate: 21_000,
            balance: U256::from(10u64).pow(U256::from(18u64)),
            next_hash: Mutex::new(TxHash::repeat_byte(0xaa)),
            receipts: Mutex::new(HashMap::new()),
            fail_send: Mutex::new(None),
            calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
            balance_calls: AtomicU32::new(0),
        }
    }
}

impl MockChainGateway {
    pub fn total_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_next_hash(&self, hash: TxHash) {
        *self.next_hash.lock().unwrap() = hash;
    }

    pub fn script_receipt(&self, hash: TxHash, receipt: OnChainReceipt) {
        self.receipts.lock().unwrap().insert(hash, receipt);
    }

    pub fn confirmed_receipt(block_number: u64) -> OnChainReceipt {
        OnChainReceipt {
            succeeded: true,
            block_number: Some(block_number),
            block_hash: Some(alloy::primitives::B256::repeat_byte(0xbb)),
            transaction_index: Some(0),
            gas_used: 21_000,
            effective_gas_price: 20_000_000_000,
            contract_address: None,
        }
    }

    pub fn reverted_receipt(block_number: u64) -> OnChainReceipt {
        OnChainReceipt {
            succeeded: false,
            block_number: Some(block_number),
            block_hash: Some(alloy::primitives::B256::repeat_byte(0xbc)),
            transaction_index: Some(1),
            gas_used: 21_000,
            effective_gas_price: 20_000_000_000,
            contract_address: None,
        }
    }
}

#[async_trait]
impl BlockchainGateway for MockChainGateway {
    async fn create_account(&self) -> GatewayResult<GeneratedAccount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let material = SigningMaterial::random();
        Ok(GeneratedAccount {
            address: material.address(),
            public_key: Some(material.public_key_hex()),
            key_ref: Some(material.export_private_key_hex()),
        })
    }

    async fn import_account(&self, signer: &SigningMaterial) -> GatewayResult<GeneratedAccount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedAccount {
            address: signer.address(),
            public_key: Some(signer.public_key_hex()),
            key_ref: Some(signer.export_private_key_hex()),
        })
    }

    async fn balance(&self, _address: Address) -> GatewayResult<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn send_transaction(&self, _request: &TransferRequest) -> GatewayResult<TxHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_send.lock().unwrap().clone() {
            return Err(GatewayError::Rpc(message));
        }
        Ok(*self.next_hash.lock().unwrap())
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Option<Address>,
        _amount: U256,
        _data: Option<Bytes>,
    ) -> GatewayResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.estimate)
    }

    async fn gas_price(&self) -> GatewayResult<u128> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price)
    }

    async fn receipt(&self, hash: TxHash) -> GatewayResult<Option<OnChainReceipt>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.lock().unwrap().get(&hash).cloned())
    }

    async fn block_number(&self) -> GatewayResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1000)
    }

    async fn is_connected(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// Scripted contract gateway.
pub struct MockContractGateway {
    /// `Err` message maps to a gateway RPC failure.
    pub deploy_result: Mutex<Result<DeployOutcome, String>>,
    pub call_result: Mutex<AbiValue>,
    pub send_hash: Mutex<TxHash>,
    pub verify_result: Mutex<bool>,
    pub calls: AtomicU32,
    pub deploy_calls: AtomicU32,
}

impl Default for MockContractGateway {
    fn default() -> Self {
        Self {
            deploy_result: Mutex::new(Ok(DeployOutcome {
                contract_address: Address::repeat_byte(0xc0),
                transaction_hash: TxHash::repeat_byte(0xdd),
                block_number: 512,
                gas_used: 1_200_000,
                cost: U256::from(24_000_000_000_000_000u128),
            })),
            call_result: Mutex::new(AbiValue::Uint(U256::from(7u64))),
            send_hash: Mutex::new(TxHash::repeat_byte(0xee)),
            verify_result: Mutex::new(true),
            calls: AtomicU32::new(0),
            deploy_calls: AtomicU32::new(0),
        }
    }
}

impl MockContractGateway {
    pub fn total_calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_deploy(&self, message: &str) {
        *self.deploy_result.lock().unwrap() = Err(message.to_string());
    }
}

#[async_trait]
impl ContractGateway for MockContractGateway {
    async fn deploy(&self, _request: &DeployRequest) -> GatewayResult<DeployOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        self.deploy_result
            .lock()
            .unwrap()
            .clone()
            .map_err(GatewayError::Rpc)
    }

    async fn call(&self, _request: &ContractCall) -> GatewayResult<AbiValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.call_result.lock().unwrap().clone())
    }

    async fn send(&self, _request: &ContractSend) -> GatewayResult<TxHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.send_hash.lock().unwrap())
    }

    async fn events(&self, _request: &EventQuery) -> GatewayResult<Vec<ContractEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn verify(&self, _request: &VerifyRequest) -> GatewayResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.verify_result.lock().unwrap())
    }
}

/// A coordinator wired to in-memory repositories and scripted gateways,
/// with handles kept for assertions.
pub struct Harness {
    pub coordinator: Arc<Coordinator>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub transactions: Arc<InMemoryTransactionRepository>,
    pub deployments: Arc<InMemoryDeploymentRepository>,
    pub chain: Arc<MockChainGateway>,
    pub contracts: Arc<MockContractGateway>,
}

pub fn harness() -> Harness {
    let accounts = Arc::new(InMemoryAccountRepository::new());
    let transactions = Arc::new(InMemoryTransactionRepository::new());
    let deployments = Arc::new(InMemoryDeploymentRepository::new());
    let chain = Arc::new(MockChainGateway::default());
    let contracts = Arc::new(MockContractGateway::default());

    let coordinator = Arc::new(Coordinator::new(
        accounts.clone() as Arc<dyn AccountRepository>,
        transactions.clone() as Arc<dyn TransactionRepository>,
        deployments.clone() as Arc<dyn DeploymentRepository>,
        chain.clone(),
        contracts.clone(),
        GasConfig::default(),
    ));

    Harness {
        coordinator,
        accounts,
        transactions,
        deployments,
        chain,
        contracts,
    }
}

/// Import a fresh account and hand back its address and private key.
pub async fn seeded_account(harness: &Harness) -> (String, String, AccountSnapshot) {
    let material = SigningMaterial::random();
    let key = material.export_private_key_hex();
    let token = tokio_util::sync::CancellationToken::new();
    let snapshot = harness
        .coordinator
        .import_account(&key, &token)
        .await
        .expect("account import");
    (snapshot.address.to_string(), key, snapshot)
}
