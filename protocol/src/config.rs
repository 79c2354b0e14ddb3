//! # Protocol Configuration & Constants
//!
//! Every constant a voucher's meaning depends on lives here. Changing a
//! domain name or version after vouchers have been handed out silently
//! invalidates every one of them, so treat these as frozen once a minter
//! is live.

use crate::types::Address;

// ---------------------------------------------------------------------------
// Signing Domains
// ---------------------------------------------------------------------------

/// Domain name used by unit-issuance (one id per unit) minters.
pub const UNIT_DOMAIN_NAME: &str = "SignatureMintERC721";

/// Domain name used by fungible-issuance minters.
pub const FUNGIBLE_DOMAIN_NAME: &str = "DToken";

/// Domain version shared by both voucher variants.
pub const DOMAIN_VERSION: &str = "1";

/// Canonical type string of the EIP-712 domain struct. Field order is part of
/// the hash, so this must never be reordered.
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Type string for per-unit-priced vouchers (carries a `uri`).
pub const UNIT_MINT_REQUEST_TYPE: &str = "MintRequest(address to,address primarySaleRecipient,string uri,uint256 quantity,uint256 pricePerToken,address currency,uint128 validityStartTimestamp,uint128 validityEndTimestamp,bytes32 uid)";

/// Type string for flat-priced vouchers.
pub const FUNGIBLE_MINT_REQUEST_TYPE: &str = "MintRequest(address to,address primarySaleRecipient,uint256 quantity,uint256 price,address currency,uint128 validityStartTimestamp,uint128 validityEndTimestamp,bytes32 uid)";

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Reserved address standing for the chain's native asset in the currency
/// registry (`0xDeadDeAddeAddEAddeadDEaDDEAdDeaDDeAD0000`). It is not
/// registered implicitly.
pub const NATIVE_CURRENCY: Address = Address::new([
    0xde, 0xad, 0xde, 0xad, 0xde, 0xad, 0xde, 0xad, 0xde, 0xad, 0xde, 0xad, 0xde, 0xad, 0xde,
    0xad, 0xde, 0xad, 0x00, 0x00,
]);

/// One whole unit of an 18-decimal asset.
pub const ONE_UNIT: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Chain id of a local development network.
pub const CHAIN_ID_DEVNET: u64 = 31_337;

/// Chain id of the public test network the minters were first run on.
pub const CHAIN_ID_TESTNET: u64 = 420;

/// Chain id of the production network.
pub const CHAIN_ID_MAINNET: u64 = 29_548;

/// Returns a friendly name for a chain id, mainly for logging.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_TESTNET => "testnet".to_string(),
        CHAIN_ID_DEVNET => "devnet".to_string(),
        other => format!("unknown({})", other),
    }
}

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Recoverable signature length: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Offset added to the recovery id when encoding `v`.
pub const RECOVERY_ID_OFFSET: u8 = 27;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_currency_matches_reserved_sentinel() {
        let parsed: Address = "0xDeadDeAddeAddEAddeadDEaDDEAdDeaDDeAD0000".parse().unwrap();
        assert_eq!(parsed, NATIVE_CURRENCY);
        assert!(!NATIVE_CURRENCY.is_zero());
    }

    #[test]
    fn domain_names_differ_per_variant() {
        assert_ne!(UNIT_DOMAIN_NAME, FUNGIBLE_DOMAIN_NAME);
    }

    #[test]
    fn request_type_strings_name_the_same_struct() {
        assert!(UNIT_MINT_REQUEST_TYPE.starts_with("MintRequest("));
        assert!(FUNGIBLE_MINT_REQUEST_TYPE.starts_with("MintRequest("));
        assert!(UNIT_MINT_REQUEST_TYPE.contains("string uri"));
        assert!(!FUNGIBLE_MINT_REQUEST_TYPE.contains("uri"));
    }

    #[test]
    fn network_name_formatting() {
        assert_eq!(network_name(CHAIN_ID_DEVNET), "devnet");
        assert_eq!(network_name(7), "unknown(7)");
    }
}
