//! # Cryptographic Primitives
//!
//! Everything a voucher's authenticity rests on:
//!
//! - **Keccak-256** for every hash in the signing path and for address
//!   derivation.
//! - **secp256k1 ECDSA with public-key recovery** for signatures, so a
//!   verifier learns *who* signed rather than just *whether* a given key did.
//!
//! Both are thin wrappers over `sha3` and `k256`. Nothing here implements
//! curve arithmetic or a hash function by hand.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, keccak256_concat};
pub use keys::{address_from_public_key, address_of, KeyError, SignerKeypair};
pub use signatures::{recover_address, sign_digest, RecoverableSignature, SignatureError};
