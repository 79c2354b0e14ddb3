//! Events emitted by a minter, in emission order.

use serde::{Deserialize, Serialize};
use std::fmt;

use sigmint_protocol::types::Address;
use sigmint_protocol::voucher::MintRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinterEvent {
    /// A voucher was redeemed.
    TokensMintedWithSignature {
        signer: Address,
        to: Address,
        /// Successful-transaction counter before this redemption.
        transaction_index: u64,
        /// Id of the first unit issued.
        first_unit: u128,
        request: MintRequest,
    },
    /// A minter issued units directly.
    TokensMinted {
        to: Address,
        quantity: u128,
        first_unit: u128,
    },
    OwnershipTransferred {
        previous: Address,
        current: Address,
    },
    MinterAdded(Address),
    MinterRemoved(Address),
    CurrencyAdded(Address),
    CurrencyRemoved(Address),
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    PrimarySaleRecipientUpdated {
        previous: Address,
        current: Address,
    },
    ContractUriUpdated {
        previous: String,
        current: String,
    },
    /// The minter now verifies vouchers against a new contract address.
    DomainRebound {
        previous: Address,
        current: Address,
    },
}

impl fmt::Display for MinterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinterEvent::TokensMintedWithSignature {
                signer,
                to,
                transaction_index,
                first_unit,
                request,
            } => write!(
                f,
                "TokensMintedWithSignature(signer={}, to={}, index={}, first_unit={}, quantity={}, uid={})",
                signer, to, transaction_index, first_unit, request.quantity, request.uid
            ),
            MinterEvent::TokensMinted {
                to,
                quantity,
                first_unit,
            } => write!(
                f,
                "TokensMinted(to={}, quantity={}, first_unit={})",
                to, quantity, first_unit
            ),
            MinterEvent::OwnershipTransferred { previous, current } => {
                write!(f, "OwnershipTransferred({} -> {})", previous, current)
            }
            MinterEvent::MinterAdded(a) => write!(f, "MinterAdded({})", a),
            MinterEvent::MinterRemoved(a) => write!(f, "MinterRemoved({})", a),
            MinterEvent::CurrencyAdded(a) => write!(f, "CurrencyAdded({})", a),
            MinterEvent::CurrencyRemoved(a) => write!(f, "CurrencyRemoved({})", a),
            MinterEvent::Paused { by } => write!(f, "Paused(by={})", by),
            MinterEvent::Unpaused { by } => write!(f, "Unpaused(by={})", by),
            MinterEvent::PrimarySaleRecipientUpdated { previous, current } => {
                write!(f, "PrimarySaleRecipientUpdated({} -> {})", previous, current)
            }
            MinterEvent::ContractUriUpdated { previous, current } => {
                write!(f, "ContractUriUpdated({:?} -> {:?})", previous, current)
            }
            MinterEvent::DomainRebound { previous, current } => {
                write!(f, "DomainRebound({} -> {})", previous, current)
            }
        }
    }
}
