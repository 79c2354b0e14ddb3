//! # Payment Collection
//!
//! Settling a voucher's price is split in two:
//!
//! 1. [`plan_payment`] validates currency and attached value without touching
//!    the ledger, and decides which of the three payment paths applies.
//! 2. [`execute_payment`] performs the single transfer the plan calls for.
//!
//! The paths are mutually exclusive:
//!
//! | Total | Currency        | Attached value | Effect                          |
//! |-------|-----------------|----------------|---------------------------------|
//! | 0     | anything        | must be 0      | none                            |
//! | > 0   | native sentinel | must equal total | native transfer payer -> payout |
//! | > 0   | token           | must be 0      | allowance pull payer -> payout  |

use serde::{Deserialize, Serialize};
use tracing::debug;

use sigmint_protocol::config::NATIVE_CURRENCY;
use sigmint_protocol::types::Address;

use crate::currency_registry::CurrencyRegistry;
use crate::errors::{MinterError, MinterResult};
use crate::ledger::Ledger;

/// The transfer a redemption has to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentPlan {
    /// Zero-price voucher.
    Free,
    Native {
        from: Address,
        to: Address,
        amount: u128,
    },
    Token {
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
}

impl PaymentPlan {
    pub fn amount(&self) -> u128 {
        match self {
            PaymentPlan::Free => 0,
            PaymentPlan::Native { amount, .. } | PaymentPlan::Token { amount, .. } => *amount,
        }
    }
}

/// Chooses the payment path and checks the attached value.
///
/// A zero total needs no registered currency. Otherwise the currency is
/// checked before the attached value.
pub fn plan_payment(
    currencies: &CurrencyRegistry,
    payer: Address,
    payout: Address,
    currency: Address,
    total: u128,
    attached: u128,
) -> MinterResult<PaymentPlan> {
    if total == 0 {
        if attached != 0 {
            return Err(MinterError::ZeroPriceValueMismatch { attached });
        }
        return Ok(PaymentPlan::Free);
    }

    currencies.ensure_supported(&currency)?;

    if currency == NATIVE_CURRENCY {
        if attached != total {
            return Err(MinterError::NativeValueMismatch {
                expected: total,
                attached,
            });
        }
        Ok(PaymentPlan::Native {
            from: payer,
            to: payout,
            amount: total,
        })
    } else {
        if attached != 0 {
            return Err(MinterError::UnexpectedNativeValue { attached });
        }
        Ok(PaymentPlan::Token {
            token: currency,
            from: payer,
            to: payout,
            amount: total,
        })
    }
}

/// Performs the plan's transfer. `spender` is the minter's own address,
/// which token pulls spend the payer's allowance for.
pub fn execute_payment<L: Ledger>(
    ledger: &mut L,
    spender: Address,
    plan: &PaymentPlan,
) -> MinterResult<()> {
    match *plan {
        PaymentPlan::Free => {}
        PaymentPlan::Native { from, to, amount } => {
            debug!(%from, %to, amount = %amount, "collecting native payment");
            ledger.transfer_native(from, to, amount)?;
        }
        PaymentPlan::Token {
            token,
            from,
            to,
            amount,
        } => {
            debug!(%token, %from, %to, amount = %amount, "collecting token payment");
            ledger.transfer_token_from(token, spender, from, to, amount)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, LedgerError};

    const PAYER: Address = Address::new([1; 20]);
    const PAYOUT: Address = Address::new([2; 20]);
    const TOKEN: Address = Address::new([3; 20]);
    const MINTER: Address = Address::new([4; 20]);

    fn registry() -> CurrencyRegistry {
        let mut r = CurrencyRegistry::new();
        r.add(NATIVE_CURRENCY).unwrap();
        r.add(TOKEN).unwrap();
        r
    }

    #[test]
    fn free_requires_no_value_and_no_currency() {
        let empty = CurrencyRegistry::new();
        assert_eq!(
            plan_payment(&empty, PAYER, PAYOUT, TOKEN, 0, 0),
            Ok(PaymentPlan::Free)
        );
        assert_eq!(
            plan_payment(&empty, PAYER, PAYOUT, TOKEN, 0, 1),
            Err(MinterError::ZeroPriceValueMismatch { attached: 1 })
        );
    }

    #[test]
    fn unsupported_currency_checked_before_value() {
        let empty = CurrencyRegistry::new();
        assert_eq!(
            plan_payment(&empty, PAYER, PAYOUT, NATIVE_CURRENCY, 10, 3),
            Err(MinterError::UnsupportedCurrency(NATIVE_CURRENCY))
        );
    }

    #[test]
    fn native_requires_exact_value() {
        assert_eq!(
            plan_payment(&registry(), PAYER, PAYOUT, NATIVE_CURRENCY, 10, 9),
            Err(MinterError::NativeValueMismatch {
                expected: 10,
                attached: 9
            })
        );
        assert_eq!(
            plan_payment(&registry(), PAYER, PAYOUT, NATIVE_CURRENCY, 10, 10)
                .unwrap()
                .amount(),
            10
        );
    }

    #[test]
    fn token_rejects_native_value() {
        assert_eq!(
            plan_payment(&registry(), PAYER, PAYOUT, TOKEN, 10, 1),
            Err(MinterError::UnexpectedNativeValue { attached: 1 })
        );
    }

    #[test]
    fn token_payment_pulls_allowance() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit_token(TOKEN, PAYER, 50).unwrap();
        ledger.approve(TOKEN, PAYER, MINTER, 50);

        let plan = plan_payment(&registry(), PAYER, PAYOUT, TOKEN, 30, 0).unwrap();
        execute_payment(&mut ledger, MINTER, &plan).unwrap();
        assert_eq!(ledger.token_balance(&TOKEN, &PAYOUT), 30);
        assert_eq!(ledger.allowance(&TOKEN, &PAYER, &MINTER), 20);
    }

    #[test]
    fn ledger_failures_surface() {
        let mut ledger = InMemoryLedger::new();
        let plan = plan_payment(&registry(), PAYER, PAYOUT, NATIVE_CURRENCY, 5, 5).unwrap();
        let err = execute_payment(&mut ledger, MINTER, &plan).unwrap_err();
        assert!(matches!(
            err,
            MinterError::Ledger(LedgerError::InsufficientBalance { .. })
        ));
    }
}
