//! Error taxonomy and stable error codes.
//!
//! Every coordinator operation returns a typed failure; nothing expected
//! escapes as a panic. Each error maps to a stable `ErrorCode` with a
//! fixed message, resolved through a pure lookup so embedding layers can
//! translate codes without touching mutable state.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::repository::RepositoryError;

/// Resource kinds referenced by not-found failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account,
    Transaction,
    Deployment,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Account => write!(f, "account"),
            Resource::Transaction => write!(f, "transaction"),
            Resource::Deployment => write!(f, "deployment"),
        }
    }
}

/// Failures surfaced by coordinator operations.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Malformed input, caught before any network call.
    #[error("validation failed for {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Referenced record does not exist (or is inactive where activity is
    /// required). Terminal for the request.
    #[error("{resource} not found: {key}")]
    NotFound { resource: Resource, key: String },

    /// Gateway call failed; carries the gateway's own message. Never
    /// retried here — retry policy belongs to the gateway or the caller.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Transition out of a terminal state, or a unique-key collision.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Repository write failed after the network operation succeeded.
    /// The on-chain side is real while the local record is missing or
    /// stale; the message carries enough context (the hash) for
    /// out-of-band repair.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The caller's cancellation token fired before submission.
    #[error("operation cancelled")]
    Cancelled,
}

impl CoordinatorError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource: Resource, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoordinatorError::Validation { field, .. } => match *field {
                "from_address" | "to_address" | "address" | "contract_address" => {
                    ErrorCode::InvalidAddress
                }
                "transaction_hash" => ErrorCode::InvalidTransactionHash,
                "amount" => ErrorCode::InvalidAmount,
                "private_key" => ErrorCode::InvalidPrivateKey,
                "bytecode" => ErrorCode::InvalidBytecode,
                "abi" => ErrorCode::InvalidAbi,
                _ => ErrorCode::ValidationFailed,
            },
            CoordinatorError::NotFound { resource, .. } => match resource {
                Resource::Account => ErrorCode::AccountNotFound,
                Resource::Transaction => ErrorCode::TransactionNotFound,
                Resource::Deployment => ErrorCode::ContractNotFound,
            },
            CoordinatorError::Gateway(e) => match e {
                GatewayError::Timeout(_) => ErrorCode::NetworkTimeout,
                GatewayError::Wallet(_) => ErrorCode::InvalidPrivateKey,
                GatewayError::InvalidResponse(_) => ErrorCode::NetworkInvalidResponse,
                _ => ErrorCode::NetworkConnectionFailed,
            },
            CoordinatorError::StateConflict(_) => ErrorCode::StateConflict,
            CoordinatorError::Persistence(_) => ErrorCode::PersistenceFailed,
            CoordinatorError::Cancelled => ErrorCode::RequestCancelled,
        }
    }
}

impl From<RepositoryError> for CoordinatorError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DuplicateAddress(_) | RepositoryError::DuplicateHash(_) => {
                CoordinatorError::StateConflict(e.to_string())
            }
            RepositoryError::Missing(id) => {
                CoordinatorError::StateConflict(format!("record {id} vanished during update"))
            }
            RepositoryError::Storage(msg) => CoordinatorError::Persistence(msg),
        }
    }
}

/// Result alias for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Stable, wire-safe error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AccountNotFound,
    AccountAlreadyExists,
    InvalidAddress,
    InvalidPrivateKey,
    TransactionNotFound,
    TransactionSendFailed,
    InvalidTransactionHash,
    InvalidAmount,
    GasEstimationFailed,
    ContractNotFound,
    ContractDeploymentFailed,
    ContractCallFailed,
    InvalidAbi,
    InvalidBytecode,
    ContractVerificationFailed,
    NetworkConnectionFailed,
    NetworkTimeout,
    NetworkInvalidResponse,
    BalanceQueryFailed,
    GasPriceQueryFailed,
    StateConflict,
    PersistenceFailed,
    ValidationFailed,
    RequestCancelled,
}

impl ErrorCode {
    /// Wire identifier for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AccountNotFound => "WEB3_20001",
            ErrorCode::AccountAlreadyExists => "WEB3_20002",
            ErrorCode::InvalidAddress => "WEB3_20007",
            ErrorCode::InvalidPrivateKey => "WEB3_20008",
            ErrorCode::TransactionNotFound => "WEB3_30001",
            ErrorCode::TransactionSendFailed => "WEB3_30002",
            ErrorCode::InvalidTransactionHash => "WEB3_30004",
            ErrorCode::InvalidAmount => "WEB3_30005",
            ErrorCode::GasEstimationFailed => "WEB3_30006",
            ErrorCode::ContractNotFound => "WEB3_40001",
            ErrorCode::ContractDeploymentFailed => "WEB3_40002",
            ErrorCode::ContractCallFailed => "WEB3_40003",
            ErrorCode::InvalidAbi => "WEB3_40004",
            ErrorCode::InvalidBytecode => "WEB3_40005",
            ErrorCode::ContractVerificationFailed => "WEB3_40006",
            ErrorCode::NetworkConnectionFailed => "WEB3_50001",
            ErrorCode::NetworkTimeout => "WEB3_50002",
            ErrorCode::NetworkInvalidResponse => "WEB3_50003",
            ErrorCode::BalanceQueryFailed => "WEB3_50004",
            ErrorCode::GasPriceQueryFailed => "WEB3_50006",
            ErrorCode::StateConflict => "WEB3_60005",
            ErrorCode::PersistenceFailed => "WEB3_60003",
            ErrorCode::ValidationFailed => "WEB3_70005",
            ErrorCode::RequestCancelled => "WEB3_70006",
        }
    }

    /// Fixed human-readable message for this code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorCode::AccountNotFound => "account does not exist",
            ErrorCode::AccountAlreadyExists => "account already exists",
            ErrorCode::InvalidAddress => "invalid blockchain address",
            ErrorCode::InvalidPrivateKey => "invalid private key format",
            ErrorCode::TransactionNotFound => "transaction does not exist",
            ErrorCode::TransactionSendFailed => "failed to send transaction",
            ErrorCode::InvalidTransactionHash => "invalid transaction hash",
            ErrorCode::InvalidAmount => "invalid transfer amount",
            ErrorCode::GasEstimationFailed => "gas estimation failed",
            ErrorCode::ContractNotFound => "contract record does not exist",
            ErrorCode::ContractDeploymentFailed => "contract deployment failed",
            ErrorCode::ContractCallFailed => "contract call failed",
            ErrorCode::InvalidAbi => "invalid contract ABI",
            ErrorCode::InvalidBytecode => "invalid contract bytecode",
            ErrorCode::ContractVerificationFailed => "contract verification failed",
            ErrorCode::NetworkConnectionFailed => "blockchain network unreachable",
            ErrorCode::NetworkTimeout => "network request timed out",
            ErrorCode::NetworkInvalidResponse => "unexpected network response shape",
            ErrorCode::BalanceQueryFailed => "balance query failed",
            ErrorCode::GasPriceQueryFailed => "gas price query failed",
            ErrorCode::StateConflict => "record state conflict",
            ErrorCode::PersistenceFailed => "record write failed after network success",
            ErrorCode::ValidationFailed => "request validation failed",
            ErrorCode::RequestCancelled => "request cancelled by caller",
        }
    }
}
