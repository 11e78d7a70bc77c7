//! Tagged ABI parameter values.
//!
//! Contract method parameters cross the gateway boundary as an ordered
//! sequence of tagged values rather than an untyped array, so encoding
//! is exhaustive and mismatches surface at the boundary instead of
//! inside the contract engine.

use alloy::primitives::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};

/// One ABI-typed parameter or decoded result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AbiValue {
    Uint(U256),
    Int(I256),
    Address(Address),
    Bool(bool),
    String(String),
    Bytes(Bytes),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Tag name, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::String(_) => "string",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::Array(_) => "array",
        }
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<u64> for AbiValue {
    fn from(v: u64) -> Self {
        AbiValue::Uint(U256::from(v))
    }
}

impl From<Address> for AbiValue {
    fn from(v: Address) -> Self {
        AbiValue::Address(v)
    }
}

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        let value = AbiValue::Array(vec![
            AbiValue::Uint(U256::from(42u64)),
            AbiValue::Address(Address::repeat_byte(7)),
            AbiValue::Bool(true),
            AbiValue::String("hello".into()),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        let back: AbiValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_tagged_encoding_names_the_type() {
        let json = serde_json::to_string(&AbiValue::Bool(false)).unwrap();
        assert!(json.contains("\"type\":\"bool\""));
    }

    #[test]
    fn test_kind() {
        assert_eq!(AbiValue::from(1u64).kind(), "uint");
        assert_eq!(AbiValue::from("x").kind(), "string");
        assert_eq!(AbiValue::Array(vec![]).kind(), "array");
    }
}
