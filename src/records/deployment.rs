//! Contract deployment lifecycle records.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::TransitionError;

/// Category of deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Token,
    Nft,
    MultiToken,
    Ledger,
    Payment,
    MultiSig,
    Proxy,
    Custom,
    Unknown,
}

/// Lifecycle state of a deployment.
///
/// `Failed` and `Verified` are terminal; `Deployed` accepts only the
/// optional verification step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Pending,
    Deploying,
    Deployed,
    Failed,
    Verified,
}

impl DeploymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Failed | DeploymentStatus::Verified)
    }

    /// Still awaiting a network outcome.
    pub fn is_unsettled(self) -> bool {
        matches!(self, DeploymentStatus::Pending | DeploymentStatus::Deploying)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
            DeploymentStatus::Verified => "verified",
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of a single contract publication.
///
/// The contract address is populated exactly when the deployment
/// succeeds; a `Failed` record never carries one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    id: Uuid,
    contract_name: String,
    contract_address: Option<Address>,
    /// Hash of the deployment transaction. Absent only when the
    /// submission never reached the network.
    transaction_hash: Option<TxHash>,
    bytecode: Bytes,
    abi: Option<String>,
    source_code: Option<String>,
    contract_type: ContractType,
    status: DeploymentStatus,
    block_number: Option<u64>,
    /// Total deployment cost in wei.
    deployment_cost: U256,
    gas_used: u64,
    error_message: Option<String>,
    deployer_account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeploymentRecord {
    pub fn new(
        contract_name: impl Into<String>,
        bytecode: Bytes,
        contract_type: ContractType,
        deployer_account_id: Uuid,
        abi: Option<String>,
        source_code: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            contract_name: contract_name.into(),
            contract_address: None,
            transaction_hash: None,
            bytecode,
            abi,
            source_code,
            contract_type,
            status: DeploymentStatus::Pending,
            block_number: None,
            deployment_cost: U256::ZERO,
            gas_used: 0,
            error_message: None,
            deployer_account_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract_address
    }

    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.transaction_hash
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    pub fn abi(&self) -> Option<&str> {
        self.abi.as_deref()
    }

    pub fn source_code(&self) -> Option<&str> {
        self.source_code.as_deref()
    }

    pub fn contract_type(&self) -> ContractType {
        self.contract_type
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn deployment_cost(&self) -> U256 {
        self.deployment_cost
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn deployer_account_id(&self) -> Uuid {
        self.deployer_account_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition(&self, to: DeploymentStatus, allowed: &[DeploymentStatus]) -> Result<(), TransitionError> {
        if !allowed.contains(&self.status) {
            return Err(TransitionError {
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        Ok(())
    }

    /// The submission has been handed to the network.
    pub fn mark_deploying(&mut self, transaction_hash: TxHash) -> Result<(), TransitionError> {
        self.transition(DeploymentStatus::Deploying, &[DeploymentStatus::Pending])?;
        self.status = DeploymentStatus::Deploying;
        self.transaction_hash = Some(transaction_hash);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_deployed(
        &mut self,
        contract_address: Address,
        transaction_hash: TxHash,
        block_number: u64,
        deployment_cost: U256,
        gas_used: u64,
    ) -> Result<(), TransitionError> {
        self.transition(
            DeploymentStatus::Deployed,
            &[DeploymentStatus::Pending, DeploymentStatus::Deploying],
        )?;
        self.status = DeploymentStatus::Deployed;
        self.contract_address = Some(contract_address);
        self.transaction_hash = Some(transaction_hash);
        self.block_number = Some(block_number);
        self.deployment_cost = deployment_cost;
        self.gas_used = gas_used;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_failed(&mut self, error_message: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(
            DeploymentStatus::Failed,
            &[DeploymentStatus::Pending, DeploymentStatus::Deploying],
        )?;
        self.status = DeploymentStatus::Failed;
        self.error_message = Some(error_message.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Source verification succeeded. Only a `Deployed` record qualifies.
    pub fn mark_verified(&mut self) -> Result<(), TransitionError> {
        self.transition(DeploymentStatus::Verified, &[DeploymentStatus::Deployed])?;
        self.status = DeploymentStatus::Verified;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attach ABI and/or source after the fact. Empty inputs are ignored.
    pub fn update_contract_info(&mut self, abi: Option<&str>, source_code: Option<&str>) {
        let mut touched = false;
        if let Some(abi) = abi {
            if !abi.trim().is_empty() {
                self.abi = Some(abi.to_string());
                touched = true;
            }
        }
        if let Some(source) = source_code {
            if !source.trim().is_empty() {
                self.source_code = Some(source.to_string());
                touched = true;
            }
        }
        if touched {
            self.updated_at = Utc::now();
        }
    }
}

/// Well-formed deployment bytecode: `0x` prefix, non-empty even-length
/// hex payload.
pub fn is_well_formed_bytecode(bytecode: &str) -> bool {
    let Some(payload) = bytecode.strip_prefix("0x") else {
        return false;
    };
    !payload.is_empty()
        && payload.len() % 2 == 0
        && payload.chars().all(|c| c.is_ascii_hexdigit())
}
