//! Canonical typed encoding of a [`MintRequest`].
//!
//! The struct hash is `keccak256(typeHash || enc(field_1) || ... || enc(field_n))`
//! with fields in type-string order. Every field encodes to one 32-byte word:
//!
//! | Type              | Encoding                           |
//! |-------------------|------------------------------------|
//! | `address`         | left-padded to 32 bytes            |
//! | `uint256/uint128` | big-endian, left-padded            |
//! | `string`          | `keccak256(utf8 bytes)`            |
//! | `bytes32`         | as is                              |

use crate::config::{FUNGIBLE_MINT_REQUEST_TYPE, UNIT_MINT_REQUEST_TYPE};
use crate::crypto::hash::{keccak256, keccak256_concat};
use crate::domain::SigningDomain;

use super::request::{MintRequest, VoucherKind, VoucherTerms};

/// Type hash of a voucher variant's struct.
pub fn type_hash(kind: VoucherKind) -> [u8; 32] {
    match kind {
        VoucherKind::PerUnit => keccak256(UNIT_MINT_REQUEST_TYPE.as_bytes()),
        VoucherKind::Flat => keccak256(FUNGIBLE_MINT_REQUEST_TYPE.as_bytes()),
    }
}

/// Encodes an unsigned integer as a 32-byte word.
pub fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// The struct hash of a request.
pub fn struct_hash(request: &MintRequest) -> [u8; 32] {
    let type_hash = type_hash(request.kind());
    let to = request.to.to_word();
    let recipient = request.primary_sale_recipient.to_word();
    let quantity = uint_word(request.quantity);
    let currency = request.currency.to_word();
    let start = uint_word(u128::from(request.validity_start));
    let end = uint_word(u128::from(request.validity_end));
    let uid = request.uid.as_bytes();

    match &request.terms {
        VoucherTerms::PerUnit {
            uri,
            price_per_token,
        } => keccak256_concat(&[
            &type_hash,
            &to,
            &recipient,
            &keccak256(uri.as_bytes()),
            &quantity,
            &uint_word(*price_per_token),
            &currency,
            &start,
            &end,
            uid,
        ]),
        VoucherTerms::Flat { price } => keccak256_concat(&[
            &type_hash,
            &to,
            &recipient,
            &quantity,
            &uint_word(*price),
            &currency,
            &start,
            &end,
            uid,
        ]),
    }
}

/// The digest a voucher signature is computed over.
pub fn signing_digest(domain: &SigningDomain, request: &MintRequest) -> [u8; 32] {
    domain.typed_data_digest(&struct_hash(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Uid};
    use crate::voucher::request::VoucherDraft;

    fn flat(price: u128) -> MintRequest {
        VoucherDraft {
            to: Address::new([0x11; 20]),
            quantity: 1,
            currency: Address::new([0x22; 20]),
            validity_start: 1,
            validity_end: 2,
            uid: Uid::from_u128(3),
            ..Default::default()
        }
        .with_terms(VoucherTerms::Flat { price })
    }

    #[test]
    fn uint_word_is_big_endian() {
        let word = uint_word(0x0102);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert_eq!(&word[..30], &[0u8; 30]);
    }

    #[test]
    fn flat_struct_hash_matches_manual_layout() {
        let req = flat(500);
        let mut buf = Vec::new();
        buf.extend_from_slice(&keccak256(FUNGIBLE_MINT_REQUEST_TYPE.as_bytes()));
        buf.extend_from_slice(&req.to.to_word());
        buf.extend_from_slice(&Address::ZERO.to_word());
        buf.extend_from_slice(&uint_word(1));
        buf.extend_from_slice(&uint_word(500));
        buf.extend_from_slice(&req.currency.to_word());
        buf.extend_from_slice(&uint_word(1));
        buf.extend_from_slice(&uint_word(2));
        buf.extend_from_slice(req.uid.as_bytes());
        assert_eq!(struct_hash(&req), keccak256(&buf));
    }

    #[test]
    fn every_field_changes_the_hash() {
        let base = flat(500);
        let base_hash = struct_hash(&base);

        let mut mutations = Vec::new();
        let mut m = base.clone();
        m.to = Address::new([0x33; 20]);
        mutations.push(m);
        let mut m = base.clone();
        m.primary_sale_recipient = Address::new([0x44; 20]);
        mutations.push(m);
        let mut m = base.clone();
        m.quantity = 2;
        mutations.push(m);
        let mut m = base.clone();
        m.currency = Address::ZERO;
        mutations.push(m);
        let mut m = base.clone();
        m.validity_start = 0;
        mutations.push(m);
        let mut m = base.clone();
        m.validity_end = 3;
        mutations.push(m);
        let mut m = base.clone();
        m.uid = Uid::from_u128(4);
        mutations.push(m);
        mutations.push(flat(501));

        for mutated in &mutations {
            assert_ne!(struct_hash(mutated), base_hash, "{:?}", mutated);
        }
    }

    #[test]
    fn variants_hash_differently() {
        let flat_req = flat(500);
        let mut unit_req = flat_req.clone();
        unit_req.terms = VoucherTerms::PerUnit {
            uri: String::new(),
            price_per_token: 500,
        };
        assert_ne!(struct_hash(&flat_req), struct_hash(&unit_req));
        assert_ne!(type_hash(VoucherKind::Flat), type_hash(VoucherKind::PerUnit));
    }

    #[test]
    fn uri_is_bound() {
        let make = |uri: &str| {
            let mut req = flat(0);
            req.terms = VoucherTerms::PerUnit {
                uri: uri.to_string(),
                price_per_token: 0,
            };
            struct_hash(&req)
        };
        assert_ne!(make("ipfs://a"), make("ipfs://b"));
    }
}
