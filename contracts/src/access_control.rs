//! # Access Control
//!
//! One owner, any number of minters. The owner is the only address whose
//! signature makes a voucher redeemable and the only caller allowed to run
//! administrative operations. Minters may only issue units directly.
//!
//! There is always exactly one non-zero owner. Ownership moves by transfer,
//! never by renunciation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use sigmint_protocol::types::Address;

use crate::errors::{MinterError, MinterResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    minters: BTreeSet<Address>,
}

impl AccessControl {
    /// Creates the registry with `owner` as the only privileged address.
    pub fn new(owner: Address) -> MinterResult<Self> {
        if owner.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(Self {
            owner,
            minters: BTreeSet::new(),
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner == *address
    }

    pub fn ensure_owner(&self, caller: &Address) -> MinterResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(MinterError::NotOwner { caller: *caller })
        }
    }

    /// Hands ownership to `new_owner`. Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> MinterResult<Address> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    pub fn is_minter(&self, address: &Address) -> bool {
        self.minters.contains(address)
    }

    /// Adds a minter. Returns `false` if it was already one.
    pub fn add_minter(&mut self, caller: &Address, minter: Address) -> MinterResult<bool> {
        self.ensure_owner(caller)?;
        if minter.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(self.minters.insert(minter))
    }

    pub fn remove_minter(&mut self, caller: &Address, minter: Address) -> MinterResult<()> {
        self.ensure_owner(caller)?;
        if minter.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        if !self.minters.remove(&minter) {
            return Err(MinterError::NotAMinter(minter));
        }
        Ok(())
    }

    pub fn minters(&self) -> impl Iterator<Item = &Address> {
        self.minters.iter()
    }
}
