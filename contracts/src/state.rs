//! # Minter Configuration & State
//!
//! [`MinterConfig`] is fixed when a minter is created (apart from the
//! verifying contract, which [`rebind`](crate::minter::VoucherMinter::rebind_contract)
//! may change). [`MinterState`] is everything administrative calls and
//! redemptions mutate. Both are plain serde structs so a host can persist
//! them however it likes. [`MinterStore`](crate::store::MinterStore) is one
//! such host.

use serde::{Deserialize, Serialize};

use sigmint_protocol::domain::{DomainParams, SigningDomain};
use sigmint_protocol::types::Address;
use sigmint_protocol::voucher::VoucherKind;

use crate::access_control::AccessControl;
use crate::currency_registry::CurrencyRegistry;
use crate::errors::{MinterError, MinterResult};
use crate::pause::PauseSwitch;
use crate::replay_guard::ReplayGuard;

// ---------------------------------------------------------------------------
// MinterConfig
// ---------------------------------------------------------------------------

/// Deployment parameters of a minter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinterConfig {
    /// Which voucher variant this minter redeems.
    pub kind: VoucherKind,
    /// Signing domain name.
    pub name: String,
    /// Signing domain version.
    pub version: String,
    pub chain_id: u64,
    /// The minter's own address. Vouchers are bound to it, and token
    /// payments are pulled against allowances granted to it.
    pub contract: Address,
    /// Initial owner.
    pub owner: Address,
    /// Where payments go when a request leaves its recipient unset.
    pub primary_sale_recipient: Address,
    #[serde(default)]
    pub contract_uri: String,
}

impl MinterConfig {
    /// Standard domain name and version for `kind`.
    pub fn new(
        kind: VoucherKind,
        chain_id: u64,
        contract: Address,
        owner: Address,
        primary_sale_recipient: Address,
    ) -> Self {
        let params = DomainParams::for_kind(kind, chain_id, contract);
        Self {
            kind,
            name: params.name,
            version: params.version,
            chain_id,
            contract,
            owner,
            primary_sale_recipient,
            contract_uri: String::new(),
        }
    }

    pub fn validate(&self) -> MinterResult<()> {
        if self.owner.is_zero() || self.primary_sale_recipient.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        Ok(())
    }

    pub fn domain(&self) -> SigningDomain {
        SigningDomain::new(
            self.name.clone(),
            self.version.clone(),
            self.chain_id,
            self.contract,
        )
    }
}

// ---------------------------------------------------------------------------
// MinterState
// ---------------------------------------------------------------------------

/// Mutable minter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinterState {
    pub access: AccessControl,
    pub currencies: CurrencyRegistry,
    pub replay: ReplayGuard,
    pub pause: PauseSwitch,
    /// Redemptions that have succeeded so far.
    pub successful_transactions: u64,
    pub primary_sale_recipient: Address,
    pub contract_uri: String,
}

impl MinterState {
    /// Initial state for a validated config.
    pub fn from_config(config: &MinterConfig) -> MinterResult<Self> {
        config.validate()?;
        Ok(Self {
            access: AccessControl::new(config.owner)?,
            currencies: CurrencyRegistry::new(),
            replay: ReplayGuard::new(),
            pause: PauseSwitch::default(),
            successful_transactions: 0,
            primary_sale_recipient: config.primary_sale_recipient,
            contract_uri: config.contract_uri.clone(),
        })
    }

    /// Resolves a request's payout address.
    pub fn payout_for(&self, requested: Address) -> Address {
        if requested.is_zero() {
            self.primary_sale_recipient
        } else {
            requested
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(recipient: Address) -> MinterConfig {
        MinterConfig::new(
            VoucherKind::PerUnit,
            31_337,
            Address::new([0xC0; 20]),
            Address::new([1; 20]),
            recipient,
        )
    }

    #[test]
    fn zero_recipient_rejected() {
        assert_eq!(
            MinterState::from_config(&config(Address::ZERO)),
            Err(MinterError::ZeroAddress)
        );
    }

    #[test]
    fn initial_state() {
        let state = MinterState::from_config(&config(Address::new([2; 20]))).unwrap();
        assert_eq!(state.access.owner(), Address::new([1; 20]));
        assert_eq!(state.successful_transactions, 0);
        assert!(state.currencies.is_empty());
        assert!(!state.pause.is_paused());
    }

    #[test]
    fn unset_payout_falls_back_to_default() {
        let state = MinterState::from_config(&config(Address::new([2; 20]))).unwrap();
        assert_eq!(state.payout_for(Address::ZERO), Address::new([2; 20]));
        assert_eq!(state.payout_for(Address::new([3; 20])), Address::new([3; 20]));
    }

    #[test]
    fn standard_domain_names() {
        let cfg = config(Address::new([2; 20]));
        assert_eq!(cfg.name, "SignatureMintERC721");
        assert_eq!(cfg.version, "1");
        assert_eq!(cfg.domain().verifying_contract(), cfg.contract);
    }
}
