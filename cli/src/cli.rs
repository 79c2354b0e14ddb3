//! # CLI Interface
//!
//! Defines the command-line argument structure for `sigmint` using `clap`
//! derive. Every subcommand operates on the minter persisted under
//! `--data-dir`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sigmint_protocol::config::{CHAIN_ID_DEVNET, NATIVE_CURRENCY};
use sigmint_protocol::types::{Address, Uid};
use sigmint_protocol::voucher::VoucherKind;

use crate::logging::LogFormat;

/// Operator tool for a signed-voucher minter.
///
/// Deploys a minter into a local store, administers it, signs vouchers
/// with the owner key and redeems them.
#[derive(Parser, Debug)]
#[command(
    name = "sigmint",
    about = "Signed-voucher minter operator tool",
    version,
    propagate_version = true
)]
pub struct SigmintCli {
    /// Directory holding the minter store.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "SIGMINT_DATA_DIR",
        default_value = "./sigmint-data"
    )]
    pub data_dir: PathBuf,

    /// Log output format.
    #[arg(long, global = true, env = "SIGMINT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new minter in the data directory.
    Init(InitArgs),
    /// Generate a fresh signing key.
    Keygen(KeygenArgs),
    /// Accept a currency for payment.
    AddCurrency(CurrencyArgs),
    /// Stop accepting a currency.
    RemoveCurrency(CurrencyArgs),
    /// Grant the direct-mint right.
    AddMinter(MinterArgs),
    /// Revoke the direct-mint right.
    RemoveMinter(MinterArgs),
    /// Halt redemptions and direct mints.
    Pause(CallerArgs),
    /// Resume redemptions and direct mints.
    Unpause(CallerArgs),
    /// Hand ownership (and voucher authority) to another address.
    TransferOwnership(TransferOwnershipArgs),
    /// Change the default payment recipient.
    SetRecipient(RecipientArgs),
    /// Change the contract metadata URI.
    SetContractUri(ContractUriArgs),
    /// Sign a voucher for this minter and print it as JSON.
    Sign(SignArgs),
    /// Redeem a signed voucher.
    Redeem(RedeemArgs),
    /// Issue units directly as a minter.
    Mint(MintArgs),
    /// Credit balances or allowances on the local ledger.
    Fund(FundArgs),
    /// Print the minter's current state.
    Status(StatusArgs),
}

/// Voucher variant, as spelled on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    /// Per-unit price with a metadata URI.
    PerUnit,
    /// One flat price per voucher.
    Flat,
}

impl From<KindArg> for VoucherKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::PerUnit => VoucherKind::PerUnit,
            KindArg::Flat => VoucherKind::Flat,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Voucher variant this minter redeems.
    #[arg(long, value_enum)]
    pub kind: KindArg,

    /// Chain id vouchers are bound to.
    #[arg(long, env = "SIGMINT_CHAIN_ID", default_value_t = CHAIN_ID_DEVNET)]
    pub chain_id: u64,

    /// Address of the minter itself (the verifying contract).
    #[arg(long)]
    pub contract: Address,

    /// Initial owner. Defaults to the address of `--key`.
    #[arg(long, required_unless_present = "key")]
    pub owner: Option<Address>,

    /// Owner key, used when `--owner` is omitted.
    #[arg(long, env = "SIGMINT_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Default payment recipient.
    #[arg(long)]
    pub recipient: Address,

    #[arg(long, default_value = "")]
    pub contract_uri: String,

    /// Currencies accepted from the start. Repeatable.
    #[arg(long = "currency")]
    pub currencies: Vec<Address>,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the hex secret to this file instead of printing it.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// The key whose address is the caller of an administrative command.
#[derive(Args, Debug)]
pub struct CallerArgs {
    /// Hex-encoded secp256k1 secret key.
    #[arg(long, env = "SIGMINT_KEY", hide_env_values = true)]
    pub key: String,
}

#[derive(Args, Debug)]
pub struct CurrencyArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// Currency address. The native sentinel selects the chain's own asset.
    #[arg(long, default_value_t = NATIVE_CURRENCY)]
    pub currency: Address,
}

#[derive(Args, Debug)]
pub struct MinterArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    #[arg(long)]
    pub minter: Address,
}

#[derive(Args, Debug)]
pub struct TransferOwnershipArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    #[arg(long)]
    pub new_owner: Address,
}

#[derive(Args, Debug)]
pub struct RecipientArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    #[arg(long)]
    pub recipient: Address,
}

#[derive(Args, Debug)]
pub struct ContractUriArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    #[arg(long)]
    pub uri: String,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// Receiver of the minted units.
    #[arg(long)]
    pub to: Address,

    #[arg(long)]
    pub quantity: u128,

    /// Per-unit price or flat price, depending on the minter's variant.
    #[arg(long, default_value_t = 0)]
    pub price: u128,

    #[arg(long, default_value_t = NATIVE_CURRENCY)]
    pub currency: Address,

    /// Metadata URI (per-unit vouchers only).
    #[arg(long, default_value = "")]
    pub uri: String,

    /// Payment recipient. Omit to pay the minter's default recipient.
    #[arg(long)]
    pub recipient: Option<Address>,

    /// Start of the validity window (unix seconds). Defaults to now.
    #[arg(long)]
    pub valid_from: Option<u64>,

    /// Length of the validity window in seconds.
    #[arg(long, default_value_t = 3_600)]
    pub valid_for: u64,

    /// Explicit voucher uid.
    #[arg(long, conflicts_with = "uid_base")]
    pub uid: Option<Uid>,

    /// Derive the uid from this base and the minter's redemption counter.
    #[arg(long)]
    pub uid_base: Option<Uid>,

    /// Write the signed voucher here instead of stdout.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RedeemArgs {
    /// Path to a signed voucher JSON file.
    #[arg(long)]
    pub voucher: PathBuf,

    /// Account paying for the redemption.
    #[arg(long)]
    pub payer: Address,

    /// Native value attached to the call.
    #[arg(long, default_value_t = 0)]
    pub value: u128,
}

#[derive(Args, Debug)]
pub struct MintArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    #[arg(long)]
    pub to: Address,

    #[arg(long)]
    pub quantity: u128,
}

#[derive(Args, Debug)]
pub struct FundArgs {
    #[arg(long)]
    pub account: Address,

    #[arg(long)]
    pub amount: u128,

    /// Token to credit. Omit for the native asset.
    #[arg(long)]
    pub token: Option<Address>,

    /// Also approve the minter to pull `amount` of `--token` from the account.
    #[arg(long, requires = "token")]
    pub approve: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Include the persisted event history.
    #[arg(long)]
    pub events: bool,
}
