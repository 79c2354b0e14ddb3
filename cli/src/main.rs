// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # sigmint Operator Tool
//!
//! Entry point for the `sigmint` binary. Parses CLI arguments, initializes
//! logging, then runs one command against the minter persisted in the data
//! directory.
//!
//! Every mutating command follows the same cycle: load the snapshot, apply
//! the call, then save the new snapshot together with the events it emitted.
//! A call that fails is never saved.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::Path;

use sigmint_contracts::{
    Clock, InMemoryLedger, MinterConfig, MinterEvent, MinterResult, MinterStore, SystemClock,
    VoucherMinter,
};
use sigmint_protocol::config::network_name;
use sigmint_protocol::crypto::SignerKeypair;
use sigmint_protocol::domain::DomainBinder;
use sigmint_protocol::types::{Address, Uid};
use sigmint_protocol::voucher::{
    next_uid, SignedVoucher, VoucherDraft, VoucherIssuer, VoucherKind, VoucherTarget,
};

use cli::{CallerArgs, Commands, SigmintCli};

type Minter = VoucherMinter<InMemoryLedger, SystemClock>;

fn main() -> Result<()> {
    let cli = SigmintCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    let data_dir = cli.data_dir;
    match cli.command {
        Commands::Init(args) => init_minter(&data_dir, args),
        Commands::Keygen(args) => keygen(args),
        Commands::AddCurrency(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.add_currency(caller, args.currency))
        }
        Commands::RemoveCurrency(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.remove_currency(caller, args.currency))
        }
        Commands::AddMinter(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.add_minter(caller, args.minter))
        }
        Commands::RemoveMinter(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.remove_minter(caller, args.minter))
        }
        Commands::Pause(args) => {
            let caller = caller_address(&args)?;
            with_minter(&data_dir, |m| m.pause(caller))
        }
        Commands::Unpause(args) => {
            let caller = caller_address(&args)?;
            with_minter(&data_dir, |m| m.unpause(caller))
        }
        Commands::TransferOwnership(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.transfer_ownership(caller, args.new_owner))
        }
        Commands::SetRecipient(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| {
                m.set_primary_sale_recipient(caller, args.recipient)
            })
        }
        Commands::SetContractUri(args) => {
            let caller = caller_address(&args.caller)?;
            with_minter(&data_dir, |m| m.set_contract_uri(caller, args.uri))
        }
        Commands::Sign(args) => sign(&data_dir, args),
        Commands::Redeem(args) => redeem(&data_dir, args).map(|_| ()),
        Commands::Mint(args) => {
            let caller = caller_address(&args.caller)?;
            let issued = with_minter(&data_dir, |m| m.mint(caller, args.to, args.quantity))?;
            println!("minted units {}..{}", issued.first, issued.first + issued.count);
            Ok(())
        }
        Commands::Fund(args) => fund(&data_dir, args),
        Commands::Status(args) => status(&data_dir, args),
    }
}

// ---------------------------------------------------------------------------
// Store plumbing
// ---------------------------------------------------------------------------

fn open_store(data_dir: &Path) -> Result<MinterStore> {
    let db_path = data_dir.join("db");
    fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create store directory: {}", db_path.display()))?;
    MinterStore::open(&db_path)
        .with_context(|| format!("failed to open store at {}", db_path.display()))
}

fn load_minter(store: &MinterStore) -> Result<Minter> {
    if !store.is_initialized()? {
        bail!("no minter found; run `sigmint init` first");
    }
    let snapshot = store.load().context("failed to load minter snapshot")?;
    Ok(VoucherMinter::from_snapshot(snapshot, SystemClock))
}

/// Saves the minter and the events it emitted since it was loaded.
fn persist(store: &MinterStore, mut minter: Minter) -> Result<()> {
    let events = minter.take_events();
    for event in &events {
        println!("{}", event);
    }
    store
        .save(&minter.into_snapshot(), &events)
        .context("failed to persist minter")
}

/// Loads the minter, applies `op` and saves the result. Nothing is written
/// when `op` fails.
fn with_minter<T>(data_dir: &Path, op: impl FnOnce(&mut Minter) -> MinterResult<T>) -> Result<T> {
    let store = open_store(data_dir)?;
    let mut minter = load_minter(&store)?;
    let out = match op(&mut minter) {
        Ok(out) => out,
        Err(err) => {
            tracing::error!(category = ?err.category(), "{}", err);
            return Err(err.into());
        }
    };
    persist(&store, minter)?;
    Ok(out)
}

fn parse_key(hex_key: &str) -> Result<SignerKeypair> {
    SignerKeypair::from_hex(hex_key).context("invalid signing key")
}

fn caller_address(args: &CallerArgs) -> Result<Address> {
    Ok(parse_key(&args.key)?.address())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn init_minter(data_dir: &Path, args: cli::InitArgs) -> Result<()> {
    let owner = match (args.owner, args.key.as_deref()) {
        (Some(owner), _) => owner,
        (None, Some(key)) => parse_key(key)?.address(),
        (None, None) => bail!("either --owner or --key is required"),
    };

    let mut config = MinterConfig::new(
        args.kind.into(),
        args.chain_id,
        args.contract,
        owner,
        args.recipient,
    );
    config.contract_uri = args.contract_uri;

    let store = open_store(data_dir)?;
    if store.is_initialized()? {
        bail!("a minter already exists in {}", data_dir.display());
    }

    let mut minter = VoucherMinter::new(config, InMemoryLedger::new(), SystemClock)
        .context("invalid minter configuration")?;
    for currency in args.currencies {
        minter.add_currency(owner, currency)?;
    }

    tracing::info!(
        kind = %minter.kind(),
        chain_id = args.chain_id,
        network = %network_name(args.chain_id),
        contract = %args.contract,
        %owner,
        "minter initialized"
    );
    persist(&store, minter)?;

    println!("Minter initialized.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Owner          : {}", owner);
    Ok(())
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    let keypair = SignerKeypair::generate();
    let address = keypair.address();

    match args.out {
        Some(path) => {
            write_secret(&path, &keypair.to_hex())?;
            tracing::info!(%address, key_path = %path.display(), "signing key generated");
            println!("{}", address);
        }
        None => {
            let out = serde_json::json!({
                "address": address,
                "secret_key": keypair.to_hex(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn write_secret(path: &Path, secret: &str) -> Result<()> {
    fs::write(path, secret)
        .with_context(|| format!("failed to write key to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

fn sign(data_dir: &Path, args: cli::SignArgs) -> Result<()> {
    let store = open_store(data_dir)?;
    let minter = load_minter(&store)?;
    let voucher = build_voucher(&minter, &args)?;

    let json = serde_json::to_string_pretty(&voucher)?;
    match &args.out {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("failed to write voucher to {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

/// Builds and signs a voucher bound to `minter`'s domain.
fn build_voucher(minter: &Minter, args: &cli::SignArgs) -> Result<SignedVoucher> {
    let keypair = parse_key(&args.caller.key)?;
    if keypair.address() != minter.owner() {
        tracing::warn!(
            signer = %keypair.address(),
            owner = %minter.owner(),
            "signer is not the minter owner; the voucher will be rejected"
        );
    }

    let uid = match (args.uid, args.uid_base) {
        (Some(uid), _) => uid,
        (None, Some(base)) => next_uid(&base, minter.successful_transactions()),
        (None, None) => Uid::new(rand::random()),
    };
    let validity_start = args.valid_from.unwrap_or_else(|| minter.clock().now());
    let draft = VoucherDraft {
        to: args.to,
        primary_sale_recipient: args.recipient.unwrap_or(Address::ZERO),
        quantity: args.quantity,
        currency: args.currency,
        validity_start,
        validity_end: validity_start.saturating_add(args.valid_for),
        uid,
    };

    let config = minter.config();
    let target = VoucherTarget {
        chain_id: config.chain_id,
        verifying_contract: config.contract,
    };
    let mut issuer = VoucherIssuer::new(
        keypair,
        DomainBinder::new(config.name.clone(), config.version.clone()),
    );
    let voucher = match minter.kind() {
        VoucherKind::PerUnit => {
            issuer.create_unit_request(target, draft, args.uri.clone(), args.price)?
        }
        VoucherKind::Flat => issuer.create_flat_request(target, draft, args.price)?,
    };
    Ok(voucher)
}

fn redeem(data_dir: &Path, args: cli::RedeemArgs) -> Result<u64> {
    let raw = fs::read_to_string(&args.voucher)
        .with_context(|| format!("failed to read voucher {}", args.voucher.display()))?;
    let voucher: SignedVoucher = serde_json::from_str(&raw).context("malformed voucher JSON")?;

    let counter = with_minter(data_dir, |m| {
        m.verify_and_redeem(args.payer, &voucher.request, &voucher.signature, args.value)
    })?;
    println!("redeemed voucher {} (redemption #{})", voucher.request.uid, counter);
    Ok(counter)
}

fn fund(data_dir: &Path, args: cli::FundArgs) -> Result<()> {
    with_minter(data_dir, |m| {
        let spender = m.config().contract;
        let ledger = m.ledger_mut();
        match args.token {
            None => ledger.credit_native(args.account, args.amount)?,
            Some(token) => {
                ledger.credit_token(token, args.account, args.amount)?;
                if args.approve {
                    ledger.approve(token, args.account, spender, args.amount);
                }
            }
        }
        Ok(())
    })?;
    tracing::info!(account = %args.account, amount = %args.amount, "account funded");
    Ok(())
}

/// Snapshot of a minter as printed by `sigmint status`.
#[derive(Debug, Serialize)]
struct StatusReport {
    kind: VoucherKind,
    domain_name: String,
    domain_version: String,
    chain_id: u64,
    network: String,
    contract: Address,
    owner: Address,
    primary_sale_recipient: Address,
    contract_uri: String,
    paused: bool,
    successful_transactions: u64,
    consumed_uids: usize,
    currencies: Vec<Address>,
    minters: Vec<Address>,
    units_issued: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<MinterEvent>>,
}

fn status_report(store: &MinterStore, minter: &Minter, with_events: bool) -> Result<StatusReport> {
    let config = minter.config();
    let state = minter.state();
    Ok(StatusReport {
        kind: config.kind,
        domain_name: config.name.clone(),
        domain_version: config.version.clone(),
        chain_id: config.chain_id,
        network: network_name(config.chain_id),
        contract: config.contract,
        owner: minter.owner(),
        primary_sale_recipient: minter.primary_sale_recipient(),
        contract_uri: minter.contract_uri().to_string(),
        paused: minter.is_paused(),
        successful_transactions: minter.successful_transactions(),
        consumed_uids: state.replay.len(),
        currencies: state.currencies.iter().copied().collect(),
        minters: state.access.minters().copied().collect(),
        units_issued: minter.ledger().total_issued(),
        events: if with_events {
            Some(store.events()?)
        } else {
            None
        },
    })
}

fn status(data_dir: &Path, args: cli::StatusArgs) -> Result<()> {
    let store = open_store(data_dir)?;
    let minter = load_minter(&store)?;
    let report = status_report(&store, &minter, args.events)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{FundArgs, InitArgs, KindArg, RedeemArgs, SignArgs};
    use std::path::PathBuf;
    use sigmint_protocol::config::NATIVE_CURRENCY;

    const CONTRACT: Address = Address::new([0xC0; 20]);
    const TREASURY: Address = Address::new([0x7E; 20]);
    const BUYER: Address = Address::new([0xB0; 20]);

    fn init(dir: &Path, kind: KindArg, owner: &SignerKeypair) {
        init_minter(
            dir,
            InitArgs {
                kind,
                chain_id: 31_337,
                contract: CONTRACT,
                owner: None,
                key: Some(owner.to_hex()),
                recipient: TREASURY,
                contract_uri: String::new(),
                currencies: vec![NATIVE_CURRENCY],
            },
        )
        .unwrap();
    }

    fn sign_args(owner: &SignerKeypair, price: u128, out: PathBuf) -> SignArgs {
        SignArgs {
            caller: CallerArgs {
                key: owner.to_hex(),
            },
            to: BUYER,
            quantity: 2,
            price,
            currency: NATIVE_CURRENCY,
            uri: "ipfs://unit".into(),
            recipient: None,
            valid_from: Some(0),
            valid_for: u64::MAX,
            uid: None,
            uid_base: Some(Uid::from_u128(100)),
            out: Some(out),
        }
    }

    fn load(dir: &Path) -> Minter {
        load_minter(&open_store(dir).unwrap()).unwrap()
    }

    #[test]
    fn init_sign_fund_redeem() {
        let dir = tempfile::tempdir().unwrap();
        let owner = SignerKeypair::generate();
        init(dir.path(), KindArg::PerUnit, &owner);

        let voucher_path = dir.path().join("voucher.json");
        sign(dir.path(), sign_args(&owner, 5, voucher_path.clone())).unwrap();

        fund(
            dir.path(),
            FundArgs {
                account: BUYER,
                amount: 10,
                token: None,
                approve: false,
            },
        )
        .unwrap();

        let counter = redeem(
            dir.path(),
            RedeemArgs {
                voucher: voucher_path.clone(),
                payer: BUYER,
                value: 10,
            },
        )
        .unwrap();
        assert_eq!(counter, 1);

        let minter = load(dir.path());
        assert_eq!(minter.ledger().units_of(&BUYER), 2);
        assert_eq!(minter.ledger().native_balance(&TREASURY), 10);
        assert!(minter.is_consumed(&next_uid(&Uid::from_u128(100), 0)));

        // Replaying the same file fails and leaves the store untouched.
        assert!(redeem(
            dir.path(),
            RedeemArgs {
                voucher: voucher_path,
                payer: BUYER,
                value: 10,
            },
        )
        .is_err());
        assert_eq!(load(dir.path()).successful_transactions(), 1);
    }

    #[test]
    fn derived_uid_follows_counter() {
        let dir = tempfile::tempdir().unwrap();
        let owner = SignerKeypair::generate();
        init(dir.path(), KindArg::Flat, &owner);

        let first_path = dir.path().join("first.json");
        sign(dir.path(), sign_args(&owner, 0, first_path.clone())).unwrap();
        redeem(
            dir.path(),
            RedeemArgs {
                voucher: first_path,
                payer: BUYER,
                value: 0,
            },
        )
        .unwrap();

        let minter = load(dir.path());
        let args = sign_args(&owner, 0, dir.path().join("unused.json"));
        let voucher = build_voucher(&minter, &args).unwrap();
        assert_eq!(voucher.request.uid, Uid::from_u128(101));
    }

    #[test]
    fn second_init_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let owner = SignerKeypair::generate();
        init(dir.path(), KindArg::Flat, &owner);
        let again = init_minter(
            dir.path(),
            InitArgs {
                kind: KindArg::Flat,
                chain_id: 31_337,
                contract: CONTRACT,
                owner: Some(owner.address()),
                key: None,
                recipient: TREASURY,
                contract_uri: String::new(),
                currencies: Vec::new(),
            },
        );
        assert!(again.is_err());
    }

    #[test]
    fn failed_admin_call_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let owner = SignerKeypair::generate();
        init(dir.path(), KindArg::Flat, &owner);

        let stranger = SignerKeypair::generate().address();
        assert!(with_minter(dir.path(), |m| m.pause(stranger)).is_err());
        assert!(!load(dir.path()).is_paused());

        with_minter(dir.path(), |m| m.pause(owner.address())).unwrap();
        assert!(load(dir.path()).is_paused());
    }

    #[test]
    fn status_lists_currencies_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let owner = SignerKeypair::generate();
        init(dir.path(), KindArg::Flat, &owner);

        let store = open_store(dir.path()).unwrap();
        let minter = load_minter(&store).unwrap();
        let report = status_report(&store, &minter, true).unwrap();
        assert_eq!(report.owner, owner.address());
        assert_eq!(report.currencies, vec![NATIVE_CURRENCY]);
        assert_eq!(report.network, "devnet");
        assert_eq!(report.events.map(|e| e.len()), Some(1));
    }
}
