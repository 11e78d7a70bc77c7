//! Durable record types.
//!
//! # Data Flow
//! ```text
//! Coordinator (single writer)
//!     → account.rs     (managed chain addresses)
//!     → transaction.rs (value transfers, contract sends)
//!     → deployment.rs  (contract publications)
//!     → repository layer persists snapshots
//! ```
//!
//! Status transitions are guarded by the records themselves: a terminal
//! record rejects every further transition with a [`TransitionError`],
//! so no caller can resurrect a settled transaction or deployment.

pub mod account;
pub mod deployment;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use deployment::{ContractType, DeploymentRecord, DeploymentStatus};
pub use transaction::{TransactionRecord, TransactionStatus};

use thiserror::Error;

/// Rejected status transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot transition from {from} to {to}")]
pub struct TransitionError {
    pub from: &'static str,
    pub to: &'static str,
}
