//! # Minter Errors
//!
//! One enum for every way a minter call can be refused. Every error is
//! terminal for the call that produced it, and no state changes survive a
//! failed call.

use std::fmt;
use thiserror::Error;

use sigmint_protocol::types::Address;

use crate::ledger::LedgerError;

/// Coarse grouping of [`MinterError`] variants, for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Wrong signer, wrong caller, reused voucher.
    Authorization,
    /// Outside the voucher's validity window.
    ValidityWindow,
    /// Malformed arguments: zero addresses, zero quantities.
    Shape,
    /// Currency, attached value or ledger settlement.
    Payment,
    /// Pause state.
    Lifecycle,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Authorization => write!(f, "Authorization"),
            ErrorCategory::ValidityWindow => write!(f, "ValidityWindow"),
            ErrorCategory::Shape => write!(f, "Shape"),
            ErrorCategory::Payment => write!(f, "Payment"),
            ErrorCategory::Lifecycle => write!(f, "Lifecycle"),
        }
    }
}

/// Why a voucher was refused as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The signature recovers to someone other than the owner.
    SignerMismatch,
    /// The signature bytes could not be parsed or recovered.
    MalformedSignature,
    /// The request is of the other voucher variant.
    WrongVariant,
    /// The uid was already redeemed.
    UidConsumed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::SignerMismatch => write!(f, "signer is not the owner"),
            Rejection::MalformedSignature => write!(f, "malformed signature"),
            Rejection::WrongVariant => write!(f, "wrong voucher variant"),
            Rejection::UidConsumed => write!(f, "uid already used"),
        }
    }
}

/// Errors returned by minter operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MinterError {
    /// The voucher is not acceptable: bad signer, bad signature, reused uid.
    #[error("invalid request: {0}")]
    InvalidRequest(Rejection),

    /// An owner-only operation was called by someone else.
    #[error("caller {caller} is not the owner")]
    NotOwner {
        /// Address that attempted the call.
        caller: Address,
    },

    /// A minter-only operation was called by a non-minter, or a non-member
    /// was removed from the minter set.
    #[error("{0} is not a minter")]
    NotAMinter(Address),

    /// `now` is outside `[validity_start, validity_end]`.
    #[error("request expired: now {now} outside [{start}, {end}]")]
    RequestExpired {
        now: u64,
        start: u64,
        end: u64,
    },

    #[error("recipient undefined")]
    RecipientUndefined,

    #[error("quantity must be greater than zero")]
    InvalidQuantity,

    #[error("address must not be zero")]
    ZeroAddress,

    #[error("currency {0} is not supported")]
    UnsupportedCurrency(Address),

    #[error("currency {0} is already supported")]
    CurrencyAlreadySupported(Address),

    /// Native payment with the wrong attached value.
    #[error("must send total price: expected {expected}, attached {attached}")]
    NativeValueMismatch {
        expected: u128,
        attached: u128,
    },

    /// Value attached to a free voucher.
    #[error("value attached to a zero-price request: {attached}")]
    ZeroPriceValueMismatch {
        attached: u128,
    },

    /// Value attached to a token-priced voucher.
    #[error("native value attached to a token-priced request: {attached}")]
    UnexpectedNativeValue {
        attached: u128,
    },

    #[error("total price overflows")]
    PriceOverflow,

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("contract is paused")]
    ContractPaused,

    #[error("contract is already paused")]
    AlreadyPaused,

    #[error("contract is not paused")]
    NotPaused,
}

impl MinterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MinterError::InvalidRequest(_)
            | MinterError::NotOwner { .. }
            | MinterError::NotAMinter(_) => ErrorCategory::Authorization,
            MinterError::RequestExpired { .. } => ErrorCategory::ValidityWindow,
            MinterError::RecipientUndefined
            | MinterError::InvalidQuantity
            | MinterError::ZeroAddress => ErrorCategory::Shape,
            MinterError::UnsupportedCurrency(_)
            | MinterError::CurrencyAlreadySupported(_)
            | MinterError::NativeValueMismatch { .. }
            | MinterError::ZeroPriceValueMismatch { .. }
            | MinterError::UnexpectedNativeValue { .. }
            | MinterError::PriceOverflow
            | MinterError::Ledger(_) => ErrorCategory::Payment,
            MinterError::ContractPaused | MinterError::AlreadyPaused | MinterError::NotPaused => {
                ErrorCategory::Lifecycle
            }
        }
    }
}

pub type MinterResult<T> = Result<T, MinterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            MinterError::InvalidRequest(Rejection::UidConsumed).category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            MinterError::RequestExpired {
                now: 0,
                start: 1,
                end: 2
            }
            .category(),
            ErrorCategory::ValidityWindow
        );
        assert_eq!(MinterError::ZeroAddress.category(), ErrorCategory::Shape);
        assert_eq!(
            MinterError::Ledger(LedgerError::Overflow).category(),
            ErrorCategory::Payment
        );
        assert_eq!(MinterError::ContractPaused.category(), ErrorCategory::Lifecycle);
    }

    #[test]
    fn messages_carry_reason() {
        let err = MinterError::InvalidRequest(Rejection::SignerMismatch);
        assert_eq!(err.to_string(), "invalid request: signer is not the owner");
        let err = MinterError::NativeValueMismatch {
            expected: 10,
            attached: 9,
        };
        assert!(err.to_string().contains("must send total price"));
    }
}
