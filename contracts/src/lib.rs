//! # sigmint Contracts
//!
//! Settlement logic for signed mint vouchers. Where `sigmint-protocol` can
//! tell who signed a voucher, this crate decides whether that is enough:
//!
//! - **Access Control**: one owner who signs vouchers and administers the
//!   minter, plus a set of minters allowed to issue directly.
//! - **Currency Registry**: which assets are accepted as payment.
//! - **Replay Guard**: each voucher uid redeems at most once.
//! - **Pause Switch**: an emergency stop for redemption and minting.
//! - **Payment**: zero-price, native and token payment paths.
//! - **Minter**: the orchestrator that runs a voucher through all of the
//!   above and issues units through a [`Ledger`](ledger::Ledger).
//! - **Store**: sled-backed persistence of a minter between runs.
//!
//! ## Design Principles
//!
//! 1. Every check happens before any effect. A refused call leaves no trace.
//! 2. State transitions are explicit: enum variants, not boolean flags.
//! 3. Balances and issuance belong to the ledger, never to the minter.
//! 4. Every public state type is serializable (serde) for persistence.

pub mod access_control;
pub mod clock;
pub mod currency_registry;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod minter;
pub mod pause;
pub mod payment;
pub mod replay_guard;
pub mod state;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{ErrorCategory, MinterError, MinterResult, Rejection};
pub use events::MinterEvent;
pub use ledger::{InMemoryLedger, IssuedRange, Ledger, LedgerError};
pub use minter::{SharedMinter, VoucherMinter};
pub use state::{MinterConfig, MinterState};
pub use store::{MinterStore, Snapshot, StoreError};
