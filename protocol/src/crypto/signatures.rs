//! # Recoverable Signatures
//!
//! secp256k1 ECDSA over a 32-byte prehashed digest, encoded as 65 bytes
//! `r || s || v` with `v = 27 + recovery_id`.
//!
//! Verification is done by *recovery*: given the digest and the signature we
//! reconstruct the signer's public key and derive its address. The caller
//! then compares that address with whoever is supposed to have signed. A
//! signature that is well-formed but was produced over a different digest
//! does not fail here. It recovers some unrelated address, and the equality
//! check upstream rejects it.
//!
//! ## Strictness
//!
//! High-`s` signatures are rejected as malformed. Every valid signature has a
//! low-`s` twin, and accepting both would make signatures malleable.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::keys::{address_of, SignerKeypair};
use crate::config::{RECOVERY_ID_OFFSET, SIGNATURE_LENGTH};
use crate::types::Address;

/// Errors during signature parsing and recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid signature encoding")]
    InvalidEncoding,

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("non-canonical signature: s is in the upper half of the curve order")]
    NonCanonical,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("signing failed")]
    SigningFailed,
}

/// A 65-byte recoverable signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; SIGNATURE_LENGTH]);

impl RecoverableSignature {
    /// Wrap raw bytes without validating them. Validation happens on recovery.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, checking only the length.
    pub fn from_slice(slice: &[u8]) -> Result<Self, SignatureError> {
        let bytes: [u8; SIGNATURE_LENGTH] = slice
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }

    /// Raw `r || s || v` bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The `v` byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `0x`-prefixed hex form, the usual wire representation.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for RecoverableSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|_| SignatureError::InvalidEncoding)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(self.0);
        write!(
            f,
            "RecoverableSignature({}...{})",
            &hex_str[..8],
            &hex_str[122..]
        )
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Sign a 32-byte digest. Deterministic (RFC 6979) and always low-`s`.
pub fn sign_digest(
    keypair: &SignerKeypair,
    digest: &[u8; 32],
) -> Result<RecoverableSignature, SignatureError> {
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest)
        .map_err(|_| SignatureError::SigningFailed)?;

    // Normalizing s negates the nonce point, which flips the y parity.
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let mut bytes = [0u8; SIGNATURE_LENGTH];
    bytes[..64].copy_from_slice(&signature.to_bytes());
    bytes[64] = recovery_id.to_byte() + RECOVERY_ID_OFFSET;
    Ok(RecoverableSignature(bytes))
}

/// Recover the address that produced `signature` over `digest`.
///
/// Accepts `v` as either `27/28` or the bare recovery id `0/1`.
pub fn recover_address(
    digest: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<Address, SignatureError> {
    let v = signature.v();
    let recovery_byte = if v >= RECOVERY_ID_OFFSET {
        v - RECOVERY_ID_OFFSET
    } else {
        v
    };
    if recovery_byte > 1 {
        return Err(SignatureError::InvalidRecoveryId(v));
    }
    let recovery_id =
        RecoveryId::from_byte(recovery_byte).ok_or(SignatureError::InvalidRecoveryId(v))?;

    let parsed =
        Signature::from_slice(&signature.0[..64]).map_err(|_| SignatureError::InvalidEncoding)?;
    if parsed.normalize_s().is_some() {
        return Err(SignatureError::NonCanonical);
    }

    let key = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_of(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;

    #[test]
    fn sign_then_recover_yields_signer() {
        let kp = SignerKeypair::generate();
        let digest = keccak256(b"mint 1 unit to alice");
        let sig = sign_digest(&kp, &digest).unwrap();
        assert_eq!(recover_address(&digest, &sig).unwrap(), kp.address());
    }

    #[test]
    fn signature_is_deterministic() {
        let kp = SignerKeypair::generate();
        let digest = keccak256(b"determinism");
        assert_eq!(
            sign_digest(&kp, &digest).unwrap(),
            sign_digest(&kp, &digest).unwrap()
        );
    }

    #[test]
    fn v_is_27_or_28() {
        let kp = SignerKeypair::generate();
        for i in 0u8..8 {
            let sig = sign_digest(&kp, &keccak256(&[i])).unwrap();
            assert!(sig.v() == 27 || sig.v() == 28);
        }
    }

    #[test]
    fn other_digest_recovers_other_address() {
        let kp = SignerKeypair::generate();
        let sig = sign_digest(&kp, &keccak256(b"original")).unwrap();
        let recovered = recover_address(&keccak256(b"tampered"), &sig);
        // Either recovery fails outright or it yields a stranger.
        if let Ok(addr) = recovered {
            assert_ne!(addr, kp.address());
        }
    }

    #[test]
    fn bare_recovery_id_is_accepted() {
        let kp = SignerKeypair::generate();
        let digest = keccak256(b"bare v");
        let mut bytes = *sign_digest(&kp, &digest).unwrap().as_bytes();
        bytes[64] -= RECOVERY_ID_OFFSET;
        let sig = RecoverableSignature::from_bytes(bytes);
        assert_eq!(recover_address(&digest, &sig).unwrap(), kp.address());
    }

    #[test]
    fn bad_v_rejected() {
        let kp = SignerKeypair::generate();
        let digest = keccak256(b"bad v");
        let mut bytes = *sign_digest(&kp, &digest).unwrap().as_bytes();
        bytes[64] = 42;
        let sig = RecoverableSignature::from_bytes(bytes);
        assert_eq!(
            recover_address(&digest, &sig),
            Err(SignatureError::InvalidRecoveryId(42))
        );
    }

    #[test]
    fn zero_signature_rejected() {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[64] = 27;
        let sig = RecoverableSignature::from_bytes(bytes);
        assert!(recover_address(&keccak256(b"x"), &sig).is_err());
    }

    #[test]
    fn high_s_rejected() {
        let kp = SignerKeypair::generate();
        let digest = keccak256(b"malleable");
        let sig = sign_digest(&kp, &digest).unwrap();
        let parsed = Signature::from_slice(&sig.as_bytes()[..64]).unwrap();
        let (r, s) = parsed.split_scalars();
        let high = Signature::from_scalars(r, -*s).unwrap();

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&high.to_bytes());
        bytes[64] = sig.v() ^ 1;
        let twin = RecoverableSignature::from_bytes(bytes);
        assert_eq!(
            recover_address(&digest, &twin),
            Err(SignatureError::NonCanonical)
        );
    }

    #[test]
    fn hex_roundtrip() {
        let kp = SignerKeypair::generate();
        let sig = sign_digest(&kp, &keccak256(b"hex")).unwrap();
        let parsed: RecoverableSignature = sig.to_hex().parse().unwrap();
        assert_eq!(parsed, sig);
        assert_eq!(
            "0xdead".parse::<RecoverableSignature>(),
            Err(SignatureError::InvalidLength(2))
        );
    }
}
