//! # Hashing Utilities
//!
//! Keccak-256 is the only hash in the signing path. Every typed-data struct
//! hash, the domain separator and the final signing digest are Keccak-256,
//! and so is the public-key-to-address derivation.
//!
//! Note that this is the original Keccak padding, not the finalized SHA3-256
//! standard. The two produce different digests for the same input.

use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use sigmint_protocol::crypto::keccak256;
///
/// let hash = keccak256(b"");
/// assert_eq!(
///     hex::encode(hash),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Hash the concatenation of several byte slices without allocating the
/// concatenated buffer.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn domain_type_hash_vector() {
        // The EIP-712 domain type hash every wallet computes.
        assert_eq!(
            hex::encode(keccak256(crate::config::EIP712_DOMAIN_TYPE.as_bytes())),
            "8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f"
        );
    }

    #[test]
    fn concat_matches_single_buffer() {
        let joined = keccak256(b"voucherredemption");
        let parts = keccak256_concat(&[b"voucher", b"redemption"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(keccak256(b"a"), keccak256(b"b"));
    }
}
