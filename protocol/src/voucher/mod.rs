//! # Vouchers
//!
//! Building, encoding, signing and recovering mint requests.
//!
//! ```text
//! request.rs : MintRequest, VoucherTerms, VoucherDraft
//! encoding.rs: canonical struct hash and signing digest
//! signing.rs : sign_voucher / recover_signer
//! issuer.rs  : VoucherIssuer with a memoized signing domain
//! uid.rs     : base + counter uid derivation
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Draft**: an issuer fills in a [`VoucherDraft`].
//! 2. **Sign**: [`VoucherIssuer`] attaches terms and signs under the
//!    minter's domain, producing a [`SignedVoucher`].
//! 3. **Redeem**: the redeemer presents request and signature to the minter,
//!    which calls [`recover_signer`] and compares the result with its owner.

pub mod encoding;
pub mod issuer;
pub mod request;
pub mod signing;
pub mod uid;

pub use encoding::{signing_digest, struct_hash};
pub use issuer::{SignedVoucher, VoucherIssuer, VoucherTarget};
pub use request::{MintRequest, VoucherDraft, VoucherKind, VoucherTerms};
pub use signing::{recover_signer, sign_voucher, VoucherSignature};
pub use uid::next_uid;
