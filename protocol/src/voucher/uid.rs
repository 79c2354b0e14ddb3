//! Uid derivation for issuers.
//!
//! Issuers that hand out many vouchers derive each uid as `base + n`, where
//! `n` is the minter's successful-transaction counter at issue time. Two
//! issuers with distinct bases never collide as long as their ranges don't
//! overlap. The minter itself never generates uids.

use crate::types::{Uid, UID_LENGTH};

/// `base + successful_transactions` as a 32-byte big-endian integer,
/// wrapping at 2^256.
pub fn next_uid(base: &Uid, successful_transactions: u64) -> Uid {
    let mut out = *base.as_bytes();
    let mut carry = 0u16;
    let addend = successful_transactions.to_be_bytes();

    for i in (0..UID_LENGTH).rev() {
        let offset = UID_LENGTH - 1 - i;
        let add = if offset < addend.len() {
            addend[addend.len() - 1 - offset]
        } else {
            0
        };
        let sum = u16::from(out[i]) + u16::from(add) + carry;
        out[i] = (sum & 0xFF) as u8;
        carry = sum >> 8;
    }
    Uid::new(out)
}
