//! Blockchain transaction and contract deployment lifecycle coordination.
//!
//! # Architecture Overview
//!
//! ```text
//!  caller (request-handling layer, out of scope)
//!      │
//!      ▼
//!  ┌─────────────┐   validate → call → persist   ┌──────────────┐
//!  │ coordinator │──────────────────────────────▶│ repositories │
//!  │             │                               │ (records)    │
//!  └──────┬──────┘                               └──────────────┘
//!         │ gateway traits
//!         ▼
//!  ┌─────────────┐  ┌──────────────────┐
//!  │ blockchain  │  │ contract engine  │   external services
//!  │ gateway     │  │ gateway          │
//!  └─────────────┘  └──────────────────┘
//!
//!  reconcile: periodic task re-reading receipts for stale records
//!  config / observability: ambient concerns shared by all of the above
//! ```
//!
//! The coordinator is the single writer of record state; gateways never
//! write to repositories.

// Core subsystems
pub mod coordinator;
pub mod gateway;
pub mod records;
pub mod repository;

// Background tasks
pub mod reconcile;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use config::Web3Config;
pub use coordinator::Coordinator;
pub use error::{CoordinatorError, CoordinatorResult, ErrorCode};
pub use reconcile::Reconciler;
