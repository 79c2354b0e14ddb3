//! Issuer-side voucher creation.
//!
//! A [`VoucherIssuer`] holds the authority key and a [`DomainBinder`], so
//! issuing many vouchers against the same minter computes the domain
//! separator once.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crypto::keys::SignerKeypair;
use crate::crypto::signatures::SignatureError;
use crate::domain::DomainBinder;
use crate::types::Address;

use super::request::{MintRequest, VoucherDraft, VoucherKind, VoucherTerms};
use super::signing::{sign_voucher, VoucherSignature};

/// A request together with its signature. This is what gets handed to a
/// redeemer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVoucher {
    pub request: MintRequest,
    pub signature: VoucherSignature,
}

/// The minter a voucher is being issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTarget {
    pub chain_id: u64,
    pub verifying_contract: Address,
}

pub struct VoucherIssuer {
    keypair: SignerKeypair,
    binder: DomainBinder,
}

impl VoucherIssuer {
    pub fn new(keypair: SignerKeypair, binder: DomainBinder) -> Self {
        Self { keypair, binder }
    }

    /// Issuer using the standard domain of a voucher variant.
    pub fn for_kind(keypair: SignerKeypair, kind: VoucherKind) -> Self {
        Self::new(keypair, DomainBinder::for_kind(kind))
    }

    /// Address vouchers from this issuer recover to.
    pub fn address(&self) -> Address {
        self.keypair.address()
    }

    pub fn binder(&self) -> &DomainBinder {
        &self.binder
    }

    /// Signs an already complete request.
    pub fn sign(
        &mut self,
        target: VoucherTarget,
        request: MintRequest,
    ) -> Result<SignedVoucher, SignatureError> {
        let domain = self
            .binder
            .domain(target.chain_id, target.verifying_contract);
        let signature = sign_voucher(domain, &request, &self.keypair)?;
        info!(
            uid = %request.uid,
            to = %request.to,
            quantity = %request.quantity,
            kind = %request.kind(),
            contract = %target.verifying_contract,
            "voucher issued"
        );
        Ok(SignedVoucher { request, signature })
    }

    /// Creates and signs a per-unit priced request.
    pub fn create_unit_request(
        &mut self,
        target: VoucherTarget,
        draft: VoucherDraft,
        uri: impl Into<String>,
        price_per_token: u128,
    ) -> Result<SignedVoucher, SignatureError> {
        let request = draft.with_terms(VoucherTerms::PerUnit {
            uri: uri.into(),
            price_per_token,
        });
        self.sign(target, request)
    }

    /// Creates and signs a flat priced request.
    pub fn create_flat_request(
        &mut self,
        target: VoucherTarget,
        draft: VoucherDraft,
        price: u128,
    ) -> Result<SignedVoucher, SignatureError> {
        self.sign(target, draft.with_terms(VoucherTerms::Flat { price }))
    }
}

impl std::fmt::Debug for VoucherIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoucherIssuer")
            .field("address", &self.address())
            .field("binder", &self.binder)
            .finish()
    }
}
