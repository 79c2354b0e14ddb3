// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # sigmint protocol: Core Library
//!
//! The stateless half of signed minting. An authority signs a mint request
//! off-line; anyone holding the request and its signature can later ask a
//! minter to honour it. This crate covers everything up to the point where a
//! minter knows *who* signed a request. Deciding whether that signer counts,
//! and settling payment, lives in `sigmint-contracts`.
//!
//! ## Architecture
//!
//! - **types**: addresses and voucher uids.
//! - **crypto**: Keccak-256 hashing, secp256k1 keys, recoverable signatures.
//! - **domain**: signing domains and their memoized separators.
//! - **voucher**: the mint request model, typed encoding, signing, issuance.
//! - **config**: domain names, type strings, the native sentinel, chain ids.
//!
//! ## Design Philosophy
//!
//! 1. Every byte a signature covers is produced by one function
//!    ([`voucher::struct_hash`]), so signer and verifier cannot drift apart.
//! 2. Recovery never fails because the *data* is wrong, only because the
//!    *signature* is malformed. Wrong data recovers a stranger.
//! 3. No floating point anywhere near an amount.

pub mod config;
pub mod crypto;
pub mod domain;
pub mod types;
pub mod voucher;

pub use domain::{DomainBinder, SigningDomain};
pub use types::{Address, Uid};
