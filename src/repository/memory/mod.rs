//! In-memory reference repositories.
//!
//! Each store is a plain map plus unique-key indexes behind one
//! `tokio::sync::RwLock`, so writers serialise and a reader never sees a
//! record with half its fields updated. Suitable as the reference
//! implementation of the repository contracts; a production deployment
//! swaps in a transactional store with the same unique constraints.

mod accounts;
mod deployments;
mod transactions;

pub use accounts::InMemoryAccountRepository;
pub use deployments::InMemoryDeploymentRepository;
pub use transactions::InMemoryTransactionRepository;
