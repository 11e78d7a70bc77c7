//! Signing material handling.
//!
//! # Security
//! - Key material is parsed once into a local signer
//! - Debug output and logs never contain the key
//! - Hex export exists only for handing material to an external keystore

use alloy::hex;
use alloy::primitives::Address;
use alloy::signers::k256::elliptic_curve::sec1::ToEncodedPoint;
use alloy::signers::local::PrivateKeySigner;

use crate::gateway::{GatewayError, GatewayResult};

/// Caller-supplied signing material wrapping a local private key.
#[derive(Clone)]
pub struct SigningMaterial {
    signer: PrivateKeySigner,
}

impl SigningMaterial {
    /// Parse a hex-encoded private key, with or without `0x` prefix.
    pub fn from_private_key(private_key_hex: &str) -> GatewayResult<Self> {
        let key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| GatewayError::Wallet(format!("invalid private key format: {e}")))?;
        Ok(Self { signer })
    }

    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Uncompressed public key, hex encoded with `0x` prefix.
    pub fn public_key_hex(&self) -> String {
        let point = self
            .signer
            .credential()
            .verifying_key()
            .to_encoded_point(false);
        format!("0x{}", hex::encode(point.as_bytes()))
    }

    /// Hex-encode the private key for storage in an external keystore.
    /// Must never be logged.
    pub fn export_private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signer.credential().to_bytes()))
    }

    /// The underlying signer, for provider construction.
    pub fn signer(&self) -> PrivateKeySigner {
        self.signer.clone()
    }
}

impl std::fmt::Debug for SigningMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningMaterial")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_from_private_key() {
        let material = SigningMaterial::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            material.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_0x_prefix_accepted() {
        let material =
            SigningMaterial::from_private_key(&format!("0x{TEST_PRIVATE_KEY}")).unwrap();
        assert_eq!(
            material.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_key_rejected() {
        let result = SigningMaterial::from_private_key("not_a_key");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid private key"));
    }

    #[test]
    fn test_export_roundtrip() {
        let material = SigningMaterial::random();
        let exported = material.export_private_key_hex();
        let reimported = SigningMaterial::from_private_key(&exported).unwrap();
        assert_eq!(reimported.address(), material.address());
    }

    #[test]
    fn test_debug_redacts_key() {
        let material = SigningMaterial::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{material:?}");
        assert!(!debug.contains("ac0974be"));
        assert!(debug.contains("address"));
    }

    #[test]
    fn test_public_key_is_uncompressed_sec1() {
        let material = SigningMaterial::random();
        let pk = material.public_key_hex();
        // 0x04 tag + 64 coordinate bytes = 65 bytes = 130 hex chars
        assert_eq!(pk.len(), 2 + 130);
        assert!(pk.starts_with("0x04"));
    }
}
