//! # Voucher Minter
//!
//! The redemption orchestrator. A [`VoucherMinter`] owns its state, a
//! ledger and a clock, and runs every voucher through the same sequence:
//!
//! 1. **Pause gate**: nothing is redeemed while paused.
//! 2. **Authenticity**: the request is of this minter's variant and its
//!    signature recovers to the current owner.
//! 3. **Shape**: a non-zero recipient.
//! 4. **Freshness**: `validity_start <= now <= validity_end`.
//! 5. **Quantity**: at least one unit.
//! 6. **Uniqueness**: the uid has not been redeemed.
//! 7. **Payment**: one of the three payment paths.
//! 8. **Effects**: consume the uid, bump the counter, issue units, emit.
//!
//! The first failing step decides the error. Steps 1 to 7 validate without
//! side effects. Ledger effects (payment, issuance) run under a checkpoint
//! and are rolled back together if either fails. State only changes after
//! both have succeeded.
//!
//! ## Concurrency
//!
//! All mutating methods take `&mut self`, so a minter has a single writer.
//! [`SharedMinter`] wraps one in `Arc<Mutex<_>>` for multi-threaded hosts.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, info, warn};

use sigmint_protocol::domain::SigningDomain;
use sigmint_protocol::types::{Address, Uid};
use sigmint_protocol::voucher::{recover_signer, MintRequest, VoucherKind, VoucherSignature};

use crate::clock::Clock;
use crate::errors::{MinterError, MinterResult, Rejection};
use crate::events::MinterEvent;
use crate::ledger::{IssuedRange, Ledger};
use crate::payment::{execute_payment, plan_payment, PaymentPlan};
use crate::state::{MinterConfig, MinterState};
use crate::store::Snapshot;

/// A voucher that passed every check and is ready to settle.
struct Validated {
    signer: Address,
    plan: PaymentPlan,
}

pub struct VoucherMinter<L, C> {
    config: MinterConfig,
    domain: SigningDomain,
    state: MinterState,
    ledger: L,
    clock: C,
    events: Vec<MinterEvent>,
}

impl<L: Ledger, C: Clock> VoucherMinter<L, C> {
    /// Creates a fresh minter. Fails with [`MinterError::ZeroAddress`] if the
    /// owner or the default sale recipient is zero.
    pub fn new(config: MinterConfig, ledger: L, clock: C) -> MinterResult<Self> {
        let state = MinterState::from_config(&config)?;
        info!(
            kind = %config.kind,
            contract = %config.contract,
            owner = %config.owner,
            chain_id = config.chain_id,
            "minter created"
        );
        Ok(Self::from_parts(config, state, ledger, clock))
    }

    /// Reassembles a minter from previously persisted parts.
    pub fn from_parts(config: MinterConfig, state: MinterState, ledger: L, clock: C) -> Self {
        let domain = config.domain();
        Self {
            config,
            domain,
            state,
            ledger,
            clock,
            events: Vec::new(),
        }
    }

    // -- Redemption ---------------------------------------------------------

    /// Verifies a voucher and, if every check passes, settles payment and
    /// issues the units.
    ///
    /// `payer` is the redeeming caller and `attached` the native value sent
    /// along. Returns the successful-transaction counter after this
    /// redemption.
    pub fn verify_and_redeem(
        &mut self,
        payer: Address,
        request: &MintRequest,
        signature: &VoucherSignature,
        attached: u128,
    ) -> MinterResult<u64> {
        let result = self.redeem_inner(payer, request, signature, attached);
        match &result {
            Ok(counter) => info!(
                uid = %request.uid,
                to = %request.to,
                quantity = %request.quantity,
                counter,
                "voucher redeemed"
            ),
            Err(e) => warn!(
                uid = %request.uid,
                payer = %payer,
                category = %e.category(),
                error = %e,
                "voucher rejected"
            ),
        }
        result
    }

    fn redeem_inner(
        &mut self,
        payer: Address,
        request: &MintRequest,
        signature: &VoucherSignature,
        attached: u128,
    ) -> MinterResult<u64> {
        let Validated { signer, plan } = self.validate(payer, request, signature, attached)?;

        let checkpoint = self.ledger.checkpoint();
        let issued = match self.settle(&plan, request) {
            Ok(issued) => issued,
            Err(e) => {
                self.ledger.rollback(checkpoint);
                return Err(e);
            }
        };

        self.state.replay.consume(request.uid);
        let transaction_index = self.state.successful_transactions;
        self.state.successful_transactions = transaction_index.saturating_add(1);
        self.events.push(MinterEvent::TokensMintedWithSignature {
            signer,
            to: request.to,
            transaction_index,
            first_unit: issued.first,
            request: request.clone(),
        });
        Ok(self.state.successful_transactions)
    }

    /// Checks 1 through 7. Never mutates anything.
    fn validate(
        &self,
        payer: Address,
        request: &MintRequest,
        signature: &VoucherSignature,
        attached: u128,
    ) -> MinterResult<Validated> {
        self.state.pause.ensure_active()?;

        let signer = self.verify_signer(request, signature)?;

        if request.to.is_zero() {
            return Err(MinterError::RecipientUndefined);
        }

        let now = self.clock.now();
        if !request.is_valid_at(now) {
            return Err(MinterError::RequestExpired {
                now,
                start: request.validity_start,
                end: request.validity_end,
            });
        }

        if request.quantity == 0 {
            return Err(MinterError::InvalidQuantity);
        }

        self.state.replay.ensure_fresh(&request.uid)?;

        let total = request.total_price().ok_or(MinterError::PriceOverflow)?;
        let payout = self.state.payout_for(request.primary_sale_recipient);
        let plan = plan_payment(
            &self.state.currencies,
            payer,
            payout,
            request.currency,
            total,
            attached,
        )?;

        Ok(Validated { signer, plan })
    }

    /// Recovers the signer and requires it to be the current owner.
    fn verify_signer(
        &self,
        request: &MintRequest,
        signature: &VoucherSignature,
    ) -> MinterResult<Address> {
        if request.kind() != self.config.kind {
            return Err(MinterError::InvalidRequest(Rejection::WrongVariant));
        }
        let signer = recover_signer(&self.domain, request, signature).map_err(|e| {
            debug!(error = %e, "signature recovery failed");
            MinterError::InvalidRequest(Rejection::MalformedSignature)
        })?;
        if !self.state.access.is_owner(&signer) {
            return Err(MinterError::InvalidRequest(Rejection::SignerMismatch));
        }
        Ok(signer)
    }

    fn settle(&mut self, plan: &PaymentPlan, request: &MintRequest) -> MinterResult<IssuedRange> {
        execute_payment(&mut self.ledger, self.config.contract, plan)?;
        Ok(self.ledger.issue(request.to, request.quantity)?)
    }

    // -- Direct minting -----------------------------------------------------

    /// Issues units without a voucher. Minters only. Does not touch the
    /// replay guard or the transaction counter.
    pub fn mint(&mut self, caller: Address, to: Address, quantity: u128) -> MinterResult<IssuedRange> {
        self.state.pause.ensure_active()?;
        if !self.state.access.is_minter(&caller) {
            return Err(MinterError::NotAMinter(caller));
        }
        if quantity == 0 {
            return Err(MinterError::InvalidQuantity);
        }
        if to.is_zero() {
            return Err(MinterError::RecipientUndefined);
        }

        let issued = self.ledger.issue(to, quantity)?;
        info!(%caller, %to, quantity = %quantity, first_unit = %issued.first, "direct mint");
        self.events.push(MinterEvent::TokensMinted {
            to,
            quantity,
            first_unit: issued.first,
        });
        Ok(issued)
    }

    // -- Administration -----------------------------------------------------

    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> MinterResult<()> {
        let previous = self.state.access.transfer_ownership(&caller, new_owner)?;
        info!(%previous, current = %new_owner, "ownership transferred");
        self.events.push(MinterEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        });
        Ok(())
    }

    /// Adds a minter. Adding an existing minter succeeds without emitting.
    pub fn add_minter(&mut self, caller: Address, minter: Address) -> MinterResult<()> {
        if self.state.access.add_minter(&caller, minter)? {
            debug!(%minter, "minter added");
            self.events.push(MinterEvent::MinterAdded(minter));
        }
        Ok(())
    }

    pub fn remove_minter(&mut self, caller: Address, minter: Address) -> MinterResult<()> {
        self.state.access.remove_minter(&caller, minter)?;
        debug!(%minter, "minter removed");
        self.events.push(MinterEvent::MinterRemoved(minter));
        Ok(())
    }

    pub fn add_currency(&mut self, caller: Address, currency: Address) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        self.state.currencies.add(currency)?;
        debug!(%currency, "currency added");
        self.events.push(MinterEvent::CurrencyAdded(currency));
        Ok(())
    }

    pub fn remove_currency(&mut self, caller: Address, currency: Address) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        self.state.currencies.remove(currency)?;
        debug!(%currency, "currency removed");
        self.events.push(MinterEvent::CurrencyRemoved(currency));
        Ok(())
    }

    pub fn pause(&mut self, caller: Address) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        self.state.pause.pause()?;
        info!(by = %caller, "minter paused");
        self.events.push(MinterEvent::Paused { by: caller });
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        self.state.pause.unpause()?;
        info!(by = %caller, "minter unpaused");
        self.events.push(MinterEvent::Unpaused { by: caller });
        Ok(())
    }

    pub fn set_primary_sale_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
    ) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        if recipient.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        let previous = std::mem::replace(&mut self.state.primary_sale_recipient, recipient);
        self.events.push(MinterEvent::PrimarySaleRecipientUpdated {
            previous,
            current: recipient,
        });
        Ok(())
    }

    pub fn set_contract_uri(&mut self, caller: Address, uri: impl Into<String>) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        let current = uri.into();
        let previous = std::mem::replace(&mut self.state.contract_uri, current.clone());
        self.events.push(MinterEvent::ContractUriUpdated { previous, current });
        Ok(())
    }

    /// Moves the minter to a new verifying contract address. Vouchers signed
    /// for the old address stop verifying.
    pub fn rebind_contract(&mut self, caller: Address, contract: Address) -> MinterResult<()> {
        self.state.access.ensure_owner(&caller)?;
        if contract.is_zero() {
            return Err(MinterError::ZeroAddress);
        }
        let previous = std::mem::replace(&mut self.config.contract, contract);
        if previous != contract {
            self.domain = self.config.domain();
        }
        info!(%previous, current = %contract, "signing domain rebound");
        self.events.push(MinterEvent::DomainRebound {
            previous,
            current: contract,
        });
        Ok(())
    }

    // -- Queries ------------------------------------------------------------

    pub fn kind(&self) -> VoucherKind {
        self.config.kind
    }

    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    pub fn state(&self) -> &MinterState {
        &self.state
    }

    pub fn owner(&self) -> Address {
        self.state.access.owner()
    }

    pub fn is_minter(&self, address: &Address) -> bool {
        self.state.access.is_minter(address)
    }

    pub fn is_supported_currency(&self, currency: &Address) -> bool {
        self.state.currencies.is_supported(currency)
    }

    pub fn is_paused(&self) -> bool {
        self.state.pause.is_paused()
    }

    pub fn is_consumed(&self, uid: &Uid) -> bool {
        self.state.replay.is_consumed(uid)
    }

    pub fn successful_transactions(&self) -> u64 {
        self.state.successful_transactions
    }

    pub fn primary_sale_recipient(&self) -> Address {
        self.state.primary_sale_recipient
    }

    /// The owner may change the default sale recipient.
    pub fn can_set_primary_sale_recipient(&self, caller: &Address) -> bool {
        self.state.access.is_owner(caller)
    }

    pub fn contract_uri(&self) -> &str {
        &self.state.contract_uri
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable ledger access for hosts that fund accounts between calls.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Events emitted since the last [`take_events`](Self::take_events).
    pub fn events(&self) -> &[MinterEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<MinterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuilds a minter from a persisted snapshot.
    pub fn from_snapshot(snapshot: Snapshot<L>, clock: C) -> Self {
        Self::from_parts(snapshot.config, snapshot.state, snapshot.ledger, clock)
    }

    /// Splits the minter into its persistable parts, dropping the clock and
    /// any undrained events.
    pub fn into_snapshot(self) -> Snapshot<L> {
        Snapshot {
            config: self.config,
            state: self.state,
            ledger: self.ledger,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedMinter
// ---------------------------------------------------------------------------

/// A minter shared between threads. Calls are serialized by a mutex, so two
/// racing redemptions of one uid resolve to exactly one success.
pub struct SharedMinter<L, C> {
    inner: Arc<Mutex<VoucherMinter<L, C>>>,
}

impl<L, C> Clone for SharedMinter<L, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Ledger, C: Clock> SharedMinter<L, C> {
    pub fn new(minter: VoucherMinter<L, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(minter)),
        }
    }

    pub fn verify_and_redeem(
        &self,
        payer: Address,
        request: &MintRequest,
        signature: &VoucherSignature,
        attached: u128,
    ) -> MinterResult<u64> {
        self.inner
            .lock()
            .verify_and_redeem(payer, request, signature, attached)
    }

    /// Locks the minter for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, VoucherMinter<L, C>> {
        self.inner.lock()
    }
}
