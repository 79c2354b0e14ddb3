//! Voucher signing and signer recovery.
//!
//! Signing is separate from building so an issuer can prepare requests
//! without holding key material. Recovery never decides whether a signer is
//! *allowed*. It only tells the caller who signed, and the minter compares
//! that against its owner.

use tracing::trace;

use crate::crypto::keys::SignerKeypair;
use crate::crypto::signatures::{recover_address, sign_digest, RecoverableSignature, SignatureError};
use crate::domain::SigningDomain;
use crate::types::Address;

use super::encoding::signing_digest;
use super::request::MintRequest;

/// Signature attached to a voucher: 65 bytes `r || s || v`.
pub type VoucherSignature = RecoverableSignature;

/// Signs `request` under `domain`.
///
/// # Example
///
/// ```
/// use sigmint_protocol::crypto::SignerKeypair;
/// use sigmint_protocol::domain::SigningDomain;
/// use sigmint_protocol::types::{Address, Uid};
/// use sigmint_protocol::voucher::{recover_signer, sign_voucher, VoucherDraft, VoucherKind, VoucherTerms};
///
/// let owner = SignerKeypair::generate();
/// let domain = SigningDomain::for_kind(VoucherKind::Flat, 31_337, Address::new([0xAA; 20]));
/// let request = VoucherDraft {
///     to: Address::new([0x01; 20]),
///     quantity: 1,
///     validity_end: u64::MAX,
///     uid: Uid::from_u128(1),
///     ..Default::default()
/// }
/// .with_terms(VoucherTerms::Flat { price: 0 });
///
/// let signature = sign_voucher(&domain, &request, &owner).unwrap();
/// assert_eq!(recover_signer(&domain, &request, &signature).unwrap(), owner.address());
/// ```
pub fn sign_voucher(
    domain: &SigningDomain,
    request: &MintRequest,
    keypair: &SignerKeypair,
) -> Result<VoucherSignature, SignatureError> {
    let digest = signing_digest(domain, request);
    trace!(uid = %request.uid, digest = %hex::encode(digest), "signing voucher");
    sign_digest(keypair, &digest)
}

/// Recovers the address that signed `request` under `domain`.
///
/// A signature over a different request, or under a different domain,
/// recovers an unrelated address rather than failing.
pub fn recover_signer(
    domain: &SigningDomain,
    request: &MintRequest,
    signature: &VoucherSignature,
) -> Result<Address, SignatureError> {
    recover_address(&signing_digest(domain, request), signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CHAIN_ID_DEVNET;
    use crate::types::Uid;
    use crate::voucher::request::{VoucherDraft, VoucherKind, VoucherTerms};

    fn request() -> MintRequest {
        VoucherDraft {
            to: Address::new([0x01; 20]),
            quantity: 2,
            currency: Address::new([0x02; 20]),
            validity_start: 0,
            validity_end: 1_000,
            uid: Uid::from_u128(0x1234567890abcdef),
            ..Default::default()
        }
        .with_terms(VoucherTerms::PerUnit {
            uri: "ipfs://meta".into(),
            price_per_token: 10,
        })
    }

    fn domain(contract: u8) -> SigningDomain {
        SigningDomain::for_kind(VoucherKind::PerUnit, CHAIN_ID_DEVNET, Address::new([contract; 20]))
    }

    #[test]
    fn signer_is_recovered() {
        let kp = SignerKeypair::generate();
        let sig = sign_voucher(&domain(1), &request(), &kp).unwrap();
        assert_eq!(recover_signer(&domain(1), &request(), &sig).unwrap(), kp.address());
    }

    #[test]
    fn other_contract_recovers_someone_else() {
        let kp = SignerKeypair::generate();
        let sig = sign_voucher(&domain(1), &request(), &kp).unwrap();
        let recovered = recover_signer(&domain(2), &request(), &sig);
        assert_ne!(recovered.ok(), Some(kp.address()));
    }

    #[test]
    fn tampered_quantity_recovers_someone_else() {
        let kp = SignerKeypair::generate();
        let sig = sign_voucher(&domain(1), &request(), &kp).unwrap();
        let mut tampered = request();
        tampered.quantity = 200;
        let recovered = recover_signer(&domain(1), &tampered, &sig);
        assert_ne!(recovered.ok(), Some(kp.address()));
    }
}
