//! Managed blockchain accounts.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Textual address shape: `0x` prefix plus 40 hex digits.
pub const ADDRESS_PREFIX: &str = "0x";
pub const ADDRESS_LEN: usize = 42;

/// Kind of account. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Externally owned account controlled by a private key.
    ExternallyOwned,
    /// Address occupied by deployed contract code.
    Contract,
    /// Multi-signature account.
    MultiSig,
    /// Application-internal system account.
    System,
}

/// A chain address under application management.
///
/// The address and kind are immutable after creation; the only mutations
/// are the active flag and a public-key refresh. Accounts are never
/// physically deleted in normal operation, only deactivated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    address: Address,
    public_key: Option<String>,
    /// Opaque reference to key material held outside the record. Never
    /// raw key bytes.
    key_ref: Option<String>,
    kind: AccountKind,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        address: Address,
        kind: AccountKind,
        public_key: Option<String>,
        key_ref: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            address,
            public_key,
            key_ref,
            kind,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn key_ref(&self) -> Option<&str> {
        self.key_ref.as_deref()
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the stored public key. Empty input is ignored.
    pub fn refresh_public_key(&mut self, public_key: &str) {
        if !public_key.trim().is_empty() {
            self.public_key = Some(public_key.to_string());
            self.updated_at = Utc::now();
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }
}

/// Structural address validation: fixed prefix, fixed total length, hex
/// payload. Checksums are deliberately not enforced here.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == ADDRESS_LEN
        && address.starts_with(ADDRESS_PREFIX)
        && address[ADDRESS_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
}
