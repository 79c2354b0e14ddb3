//! # Ledger Collaborator
//!
//! The minter never keeps balances itself. Moving money and creating units
//! are delegated to a [`Ledger`], which on a real chain would be the host's
//! native balance table, the token contracts and the unit registry.
//!
//! A redemption touches the ledger twice (payment, then issuance). Both must
//! land or neither, so the trait exposes [`Ledger::checkpoint`] and
//! [`Ledger::rollback`]. The minter takes a checkpoint before the first
//! effect and rolls back if any later effect fails.
//!
//! [`InMemoryLedger`] is the reference implementation used by tests and by
//! the operator CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

use sigmint_protocol::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures reported by a ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The payer does not hold enough of the native asset.
    #[error("insufficient native balance for {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: Address,
        needed: u128,
        available: u128,
    },

    /// The payer does not hold enough of a token.
    #[error("insufficient {token} balance for {account}: needed {needed}, available {available}")]
    InsufficientTokenBalance {
        token: Address,
        account: Address,
        needed: u128,
        available: u128,
    },

    /// The spender has not been approved for enough of the owner's tokens.
    #[error("insufficient {token} allowance from {owner} to {spender}: needed {needed}, available {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    /// A balance or supply counter would overflow.
    #[error("ledger arithmetic overflow")]
    Overflow,
}

/// Units created by one issuance: ids `first .. first + count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedRange {
    pub first: u128,
    pub count: u128,
}

// ---------------------------------------------------------------------------
// Ledger trait
// ---------------------------------------------------------------------------

/// Balance and issuance primitives the minter consumes.
pub trait Ledger {
    /// Opaque snapshot that [`rollback`](Ledger::rollback) restores.
    type Checkpoint;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    /// Moves native value from `from` to `to`.
    fn transfer_native(&mut self, from: Address, to: Address, amount: u128)
        -> Result<(), LedgerError>;

    /// Pulls `amount` of `token` from `from` to `to`, spending `spender`'s
    /// allowance.
    fn transfer_token_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Creates `quantity` new units owned by `to`.
    fn issue(&mut self, to: Address, quantity: u128) -> Result<IssuedRange, LedgerError>;
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// A plain in-memory ledger. Checkpoints are full clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    native: BTreeMap<Address, u128>,
    /// token -> holder -> balance
    tokens: BTreeMap<Address, BTreeMap<Address, u128>>,
    /// token -> owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, BTreeMap<Address, u128>>>,
    /// holder -> units held
    units: BTreeMap<Address, u128>,
    next_unit: u128,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Funding ------------------------------------------------------------

    /// Adds native value to an account out of thin air.
    pub fn credit_native(&mut self, account: Address, amount: u128) -> Result<(), LedgerError> {
        let balance = self.native.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Adds token balance to an account out of thin air.
    pub fn credit_token(
        &mut self,
        token: Address,
        account: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let balance = self
            .tokens
            .entry(token)
            .or_default()
            .entry(account)
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Sets `spender`'s allowance over `owner`'s `token` balance.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: u128) {
        self.allowances
            .entry(token)
            .or_default()
            .entry(owner)
            .or_default()
            .insert(spender, amount);
    }

    // -- Queries ------------------------------------------------------------

    pub fn native_balance(&self, account: &Address) -> u128 {
        self.native.get(account).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, token: &Address, account: &Address) -> u128 {
        self.tokens
            .get(token)
            .and_then(|holders| holders.get(account))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(token)
            .and_then(|owners| owners.get(owner))
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Units currently held by `account`.
    pub fn units_of(&self, account: &Address) -> u128 {
        self.units.get(account).copied().unwrap_or(0)
    }

    /// Total units ever issued. Also the id the next unit will get.
    pub fn total_issued(&self) -> u128 {
        self.next_unit
    }
}

impl Ledger for InMemoryLedger {
    type Checkpoint = InMemoryLedger;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        trace!("rolling back ledger to checkpoint");
        *self = checkpoint;
    }

    fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.native_balance(&from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            })?;
        self.native.insert(from, remaining);
        self.credit_native(to, amount)
    }

    fn transfer_token_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(&token, &from, &spender);
        let remaining_allowance =
            allowed
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientAllowance {
                    token,
                    owner: from,
                    spender,
                    needed: amount,
                    available: allowed,
                })?;

        let available = self.token_balance(&token, &from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientTokenBalance {
                token,
                account: from,
                needed: amount,
                available,
            })?;

        self.approve(token, from, spender, remaining_allowance);
        self.tokens.entry(token).or_default().insert(from, remaining);
        self.credit_token(token, to, amount)
    }

    fn issue(&mut self, to: Address, quantity: u128) -> Result<IssuedRange, LedgerError> {
        let first = self.next_unit;
        self.next_unit = first.checked_add(quantity).ok_or(LedgerError::Overflow)?;
        let held = self.units.entry(to).or_insert(0);
        *held = held.checked_add(quantity).ok_or(LedgerError::Overflow)?;
        Ok(IssuedRange {
            first,
            count: quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn native_transfer_moves_value() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit_native(addr(1), 100).unwrap();
        ledger.transfer_native(addr(1), addr(2), 40).unwrap();
        assert_eq!(ledger.native_balance(&addr(1)), 60);
        assert_eq!(ledger.native_balance(&addr(2)), 40);
    }

    #[test]
    fn native_transfer_rejects_overdraft() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit_native(addr(1), 10).unwrap();
        let err = ledger.transfer_native(addr(1), addr(2), 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: addr(1),
                needed: 11,
                available: 10
            }
        );
        assert_eq!(ledger.native_balance(&addr(1)), 10);
    }

    #[test]
    fn token_pull_spends_allowance() {
        let (token, owner, spender, payee) = (addr(9), addr(1), addr(2), addr(3));
        let mut ledger = InMemoryLedger::new();
        ledger.credit_token(token, owner, 1_000).unwrap();
        ledger.approve(token, owner, spender, 600);

        ledger
            .transfer_token_from(token, spender, owner, payee, 500)
            .unwrap();
        assert_eq!(ledger.token_balance(&token, &owner), 500);
        assert_eq!(ledger.token_balance(&token, &payee), 500);
        assert_eq!(ledger.allowance(&token, &owner, &spender), 100);

        let err = ledger
            .transfer_token_from(token, spender, owner, payee, 200)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    }

    #[test]
    fn token_pull_checks_balance() {
        let (token, owner, spender) = (addr(9), addr(1), addr(2));
        let mut ledger = InMemoryLedger::new();
        ledger.credit_token(token, owner, 5).unwrap();
        ledger.approve(token, owner, spender, 100);
        let err = ledger
            .transfer_token_from(token, spender, owner, addr(3), 6)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientTokenBalance { .. }));
    }

    #[test]
    fn issue_assigns_consecutive_ids() {
        let mut ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.issue(addr(1), 3).unwrap(),
            IssuedRange { first: 0, count: 3 }
        );
        assert_eq!(
            ledger.issue(addr(2), 2).unwrap(),
            IssuedRange { first: 3, count: 2 }
        );
        assert_eq!(ledger.units_of(&addr(1)), 3);
        assert_eq!(ledger.total_issued(), 5);
    }

    #[test]
    fn rollback_restores_checkpoint() {
        let mut ledger = InMemoryLedger::new();
        ledger.credit_native(addr(1), 100).unwrap();
        let cp = ledger.checkpoint();
        ledger.transfer_native(addr(1), addr(2), 100).unwrap();
        ledger.issue(addr(2), 1).unwrap();
        ledger.rollback(cp);
        assert_eq!(ledger.native_balance(&addr(1)), 100);
        assert_eq!(ledger.total_issued(), 0);
    }
}
