//! # Key Management
//!
//! secp256k1 keypairs for voucher issuers.
//!
//! A voucher is authorized by whoever holds the minter owner's secret key, so
//! this type is the whole trust root of the protocol. The address of a key is
//! the last 20 bytes of the Keccak-256 hash of its uncompressed public point
//! (without the `0x04` prefix), which is what signature recovery yields on the
//! verifier side.
//!
//! ## Security considerations
//!
//! - Secret scalars are zeroized on drop by `k256`.
//! - Key generation uses the OS RNG.
//! - Key bytes are never logged and never appear in `Debug` output.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use super::hash::keccak256;
use crate::config::SECRET_KEY_LENGTH;
use crate::types::Address;

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid secp256k1 point")]
    InvalidPublicKey,
}

/// An issuer keypair.
///
/// `SignerKeypair` intentionally does NOT implement `Serialize`. Exporting a
/// secret key should be a deliberate call to [`to_hex`](Self::to_hex).
pub struct SignerKeypair {
    signing_key: SigningKey,
}

impl SignerKeypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a 32-byte secret scalar.
    ///
    /// Fails for zero and for values not below the curve order.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex secret, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&arr)
    }

    /// Exports the raw 32-byte secret. Handle with care.
    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes().into()
    }

    /// Hex-encoded secret (no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.secret_bytes())
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Underlying signing key for the signature module.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl Clone for SignerKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for SignerKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignerKeypair(address={})", self.address())
    }
}

impl PartialEq for SignerKeypair {
    /// Compares addresses, never secret material.
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for SignerKeypair {}

/// Derive the address of a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}

/// Parse a SEC1-encoded public key (compressed or uncompressed) and return
/// its address.
pub fn address_from_public_key(sec1_bytes: &[u8]) -> Result<Address, KeyError> {
    let key = VerifyingKey::from_sec1_bytes(sec1_bytes).map_err(|_| KeyError::InvalidPublicKey)?;
    Ok(address_of(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> SignerKeypair {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        SignerKeypair::from_bytes(&secret).unwrap()
    }

    #[test]
    fn known_secret_derives_known_address() {
        // Secret scalar 1 maps to the generator point, whose address is a
        // widely published vector.
        assert_eq!(
            key_one().address().to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert!(SignerKeypair::from_bytes(&[0u8; 32]).is_err());
    }

    #[test]
    fn hex_roundtrip_preserves_address() {
        let kp = SignerKeypair::generate();
        let restored = SignerKeypair::from_hex(&format!("0x{}", kp.to_hex())).unwrap();
        assert_eq!(kp.address(), restored.address());
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(SignerKeypair::from_hex("deadbeef").is_err());
        assert!(SignerKeypair::from_hex("not-hex-at-all").is_err());
    }

    #[test]
    fn generated_keys_are_distinct() {
        assert_ne!(
            SignerKeypair::generate().address(),
            SignerKeypair::generate().address()
        );
    }

    #[test]
    fn public_key_bytes_map_to_same_address() {
        let kp = key_one();
        let compressed = kp.signing_key().verifying_key().to_encoded_point(true);
        assert_eq!(
            address_from_public_key(compressed.as_bytes()).unwrap(),
            kp.address()
        );
        assert!(address_from_public_key(&[0u8; 33]).is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = key_one();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("SignerKeypair(address="));
        assert!(!debug_str.contains(&kp.to_hex()));
    }
}
