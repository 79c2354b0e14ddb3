//! The set of assets a minter accepts as payment.
//!
//! The native asset is not implicitly accepted. It has to be registered
//! under [`NATIVE_CURRENCY`](sigmint_protocol::config::NATIVE_CURRENCY) like
//! any token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use sigmint_protocol::types::Address;

use crate::errors::{MinterError, MinterResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRegistry {
    currencies: BTreeSet<Address>,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_supported(&self, currency: &Address) -> bool {
        self.currencies.contains(currency)
    }

    pub fn ensure_supported(&self, currency: &Address) -> MinterResult<()> {
        if self.is_supported(currency) {
            Ok(())
        } else {
            Err(MinterError::UnsupportedCurrency(*currency))
        }
    }

    pub fn add(&mut self, currency: Address) -> MinterResult<()> {
        if !self.currencies.insert(currency) {
            return Err(MinterError::CurrencyAlreadySupported(currency));
        }
        Ok(())
    }

    pub fn remove(&mut self, currency: Address) -> MinterResult<()> {
        if !self.currencies.remove(&currency) {
            return Err(MinterError::UnsupportedCurrency(currency));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.currencies.iter()
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}
