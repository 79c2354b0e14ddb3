//! # Signing Domains
//!
//! A signing domain pins a signature to one (name, version, network,
//! verifying contract) tuple. The domain separator is folded into every
//! signing digest, so a voucher signed for one minter is worthless on any
//! other minter, on any other network, or under any other version.
//!
//! ```text
//! separator = keccak256(
//!     keccak256("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")
//!     || keccak256(name)
//!     || keccak256(version)
//!     || uint256(chainId)
//!     || address(verifyingContract)
//! )
//! digest = keccak256(0x19 || 0x01 || separator || structHash)
//! ```
//!
//! Computing a separator costs four hashes. [`SigningDomain`] computes it once
//! on construction and [`DomainBinder`] keeps the last domain around until the
//! verifying entity changes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DOMAIN_VERSION, EIP712_DOMAIN_TYPE, FUNGIBLE_DOMAIN_NAME, UNIT_DOMAIN_NAME};
use crate::crypto::hash::{keccak256, keccak256_concat};
use crate::types::Address;
use crate::voucher::VoucherKind;

/// Prefix bytes of an EIP-712 signing digest.
const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Identity of a signing domain, without the cached separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainParams {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainParams {
    /// Default parameters for a voucher variant.
    pub fn for_kind(kind: VoucherKind, chain_id: u64, verifying_contract: Address) -> Self {
        let name = match kind {
            VoucherKind::PerUnit => UNIT_DOMAIN_NAME,
            VoucherKind::Flat => FUNGIBLE_DOMAIN_NAME,
        };
        Self {
            name: name.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }
}

/// A signing domain with its separator precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDomain {
    params: DomainParams,
    separator: [u8; 32],
}

impl SigningDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self::from_params(DomainParams {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        })
    }

    pub fn from_params(params: DomainParams) -> Self {
        let separator = compute_separator(&params);
        Self { params, separator }
    }

    /// Domain for a voucher variant using the standard names and version.
    pub fn for_kind(kind: VoucherKind, chain_id: u64, verifying_contract: Address) -> Self {
        Self::from_params(DomainParams::for_kind(kind, chain_id, verifying_contract))
    }

    pub fn params(&self) -> &DomainParams {
        &self.params
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn version(&self) -> &str {
        &self.params.version
    }

    pub fn chain_id(&self) -> u64 {
        self.params.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.params.verifying_contract
    }

    /// The cached domain separator.
    pub fn separator(&self) -> &[u8; 32] {
        &self.separator
    }

    /// `keccak256(0x19 0x01 || separator || struct_hash)`.
    pub fn typed_data_digest(&self, struct_hash: &[u8; 32]) -> [u8; 32] {
        keccak256_concat(&[&TYPED_DATA_PREFIX, &self.separator, struct_hash])
    }
}

fn compute_separator(params: &DomainParams) -> [u8; 32] {
    let mut chain_word = [0u8; 32];
    chain_word[24..].copy_from_slice(&params.chain_id.to_be_bytes());

    keccak256_concat(&[
        &keccak256(EIP712_DOMAIN_TYPE.as_bytes()),
        &keccak256(params.name.as_bytes()),
        &keccak256(params.version.as_bytes()),
        &chain_word,
        &params.verifying_contract.to_word(),
    ])
}

// ---------------------------------------------------------------------------
// DomainBinder
// ---------------------------------------------------------------------------

/// Memoizes the signing domain for one (name, version) pair.
///
/// Asking for the same (chain id, contract) again returns the cached domain;
/// asking for a different one recomputes and replaces it.
#[derive(Debug, Clone)]
pub struct DomainBinder {
    name: String,
    version: String,
    current: Option<SigningDomain>,
    computations: u64,
}

impl DomainBinder {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            current: None,
            computations: 0,
        }
    }

    /// Binder using the standard name and version of a voucher variant.
    pub fn for_kind(kind: VoucherKind) -> Self {
        let params = DomainParams::for_kind(kind, 0, Address::ZERO);
        Self::new(params.name, params.version)
    }

    /// The domain for `(chain_id, verifying_contract)`, computed at most once
    /// per change of verifying entity.
    pub fn domain(&mut self, chain_id: u64, verifying_contract: Address) -> &SigningDomain {
        let stale = !matches!(
            &self.current,
            Some(d) if d.chain_id() == chain_id && d.verifying_contract() == verifying_contract
        );
        if stale {
            self.rebind(chain_id, verifying_contract);
        }
        self.current.get_or_insert_with(|| {
            SigningDomain::new(
                self.name.clone(),
                self.version.clone(),
                chain_id,
                verifying_contract,
            )
        })
    }

    /// Forces a recomputation for a new verifying entity.
    pub fn rebind(&mut self, chain_id: u64, verifying_contract: Address) -> &SigningDomain {
        debug!(
            name = %self.name,
            chain_id,
            contract = %verifying_contract,
            "binding signing domain"
        );
        self.computations += 1;
        self.current.insert(SigningDomain::new(
            self.name.clone(),
            self.version.clone(),
            chain_id,
            verifying_contract,
        ))
    }

    /// The currently bound domain, if any.
    pub fn current(&self) -> Option<&SigningDomain> {
        self.current.as_ref()
    }

    /// How many separators this binder has computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
