//! The mint request model.
//!
//! A request has a core every variant shares (who receives, how many, which
//! currency, when, which uid) and a [`VoucherTerms`] tag carrying the
//! variant-specific pricing. Per-unit vouchers are charged
//! `price_per_token * quantity`. Flat vouchers are charged `price` once,
//! whatever the quantity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Address, Uid};

/// Which voucher variant a minter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherKind {
    /// One issued id per unit, priced per unit, carries a metadata uri.
    PerUnit,
    /// Fungible issuance with a single flat price.
    Flat,
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerUnit => write!(f, "per-unit"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

/// Variant-specific terms of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherTerms {
    PerUnit {
        /// Metadata uri of the units being minted.
        uri: String,
        /// Price of one unit in the smallest denomination of `currency`.
        price_per_token: u128,
    },
    Flat {
        /// Total price of the request, independent of quantity.
        price: u128,
    },
}

impl VoucherTerms {
    pub fn kind(&self) -> VoucherKind {
        match self {
            Self::PerUnit { .. } => VoucherKind::PerUnit,
            Self::Flat { .. } => VoucherKind::Flat,
        }
    }
}

/// A signed authorization to mint, once.
///
/// Every field is covered by the signature. Changing any of them after
/// signing makes the voucher recover to an unrelated address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Recipient of the minted units. Must be non-zero.
    pub to: Address,
    /// Payout address. Zero means the minter's default recipient.
    pub primary_sale_recipient: Address,
    /// Units to mint. Must be positive.
    pub quantity: u128,
    /// Payment asset: the native sentinel or a token address.
    pub currency: Address,
    /// First valid second (unix time, inclusive).
    pub validity_start: u64,
    /// Last valid second (unix time, inclusive).
    pub validity_end: u64,
    /// One-time identifier.
    pub uid: Uid,
    pub terms: VoucherTerms,
}

impl MintRequest {
    pub fn kind(&self) -> VoucherKind {
        self.terms.kind()
    }

    /// Total amount due, or `None` if `price_per_token * quantity` overflows.
    pub fn total_price(&self) -> Option<u128> {
        match &self.terms {
            VoucherTerms::PerUnit {
                price_per_token, ..
            } => price_per_token.checked_mul(self.quantity),
            VoucherTerms::Flat { price } => Some(*price),
        }
    }

    /// Inclusive check of `validity_start <= now <= validity_end`.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.validity_start <= now && now <= self.validity_end
    }

    /// The uri of a per-unit request.
    pub fn uri(&self) -> Option<&str> {
        match &self.terms {
            VoucherTerms::PerUnit { uri, .. } => Some(uri),
            VoucherTerms::Flat { .. } => None,
        }
    }
}

/// The variant-independent part of a request, filled in by issuers before
/// the terms are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherDraft {
    pub to: Address,
    pub primary_sale_recipient: Address,
    pub quantity: u128,
    pub currency: Address,
    pub validity_start: u64,
    pub validity_end: u64,
    pub uid: Uid,
}

impl VoucherDraft {
    /// Completes the draft into a request.
    pub fn with_terms(self, terms: VoucherTerms) -> MintRequest {
        MintRequest {
            to: self.to,
            primary_sale_recipient: self.primary_sale_recipient,
            quantity: self.quantity,
            currency: self.currency,
            validity_start: self.validity_start,
            validity_end: self.validity_end,
            uid: self.uid,
            terms,
        }
    }
}
