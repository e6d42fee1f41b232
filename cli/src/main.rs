// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # algo-tx
//!
//! Entry point for the `algo-tx` binary. Parses CLI arguments, initializes
//! logging, and runs one offline operation over files of canonical bytes.
//!
//! - `account`  — create a key or restore one from its mnemonic
//! - `address`  — multisig and program addresses
//! - `pay`      — build an unsigned payment from suggested params
//! - `sign`     — single-key signing
//! - `msig`     — multisig sign / append / merge
//! - `lsig`     — logic signature create / msig / sign
//! - `inspect`  — decode any transaction or envelope file as JSON
//! - `group`    — link transactions into an atomic group
//! - `version`  — print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::Parser;
use serde_json::{json, Value as Json};
use std::fs;
use std::path::{Path, PathBuf};

use algo_protocol::codec;
use algo_protocol::crypto::Keypair;
use algo_protocol::identity::mnemonic;
use algo_protocol::logicsig::{self, Delegation, LogicSig};
use algo_protocol::multisig::{self, MultisigAccount};
use algo_protocol::transaction::{
    self, Authorization, NodeParams, Payment, SignedTransaction, SuggestedParams, Transaction,
    TransactionBuilder, TransactionKind,
};

use cli::{
    AccountCommand, AddressCommand, AlgoTxCli, Commands, GroupArgs, KeyArgs, LsigCommand,
    MsigCommand, MultisigArgs, PayArgs, SignArgs,
};

fn main() -> Result<()> {
    let cli = AlgoTxCli::parse();
    logging::init_logging("algo_tx=info,algo_protocol=warn", cli.log_format);

    match cli.command {
        Commands::Account(cmd) => account(cmd),
        Commands::Address(cmd) => address(cmd),
        Commands::Pay(args) => pay(args),
        Commands::Sign(args) => sign(args),
        Commands::Msig(cmd) => msig(cmd),
        Commands::Lsig(cmd) => lsig(cmd),
        Commands::Inspect(args) => inspect(&args.file),
        Commands::Group(args) => group(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), len = bytes.len(), "wrote file");
    Ok(())
}

fn load_keypair(args: &KeyArgs) -> Result<Keypair> {
    let phrase = fs::read_to_string(&args.mnemonic_file).with_context(|| {
        format!(
            "failed to read mnemonic file {}",
            args.mnemonic_file.display()
        )
    })?;
    mnemonic::to_keypair(&phrase).context("mnemonic does not decode to a key")
}

fn load_params(path: &Path) -> Result<SuggestedParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read suggested params {}", path.display()))?;
    let node: NodeParams = serde_json::from_str(&text)
        .with_context(|| format!("malformed suggested params in {}", path.display()))?;
    Ok(node.into())
}

fn load_transaction(path: &Path) -> Result<Transaction> {
    Transaction::decode(&read_file(path)?)
        .with_context(|| format!("{} is not a canonical transaction", path.display()))
}

fn load_logicsig(path: &Path) -> Result<LogicSig> {
    codec::from_slice(&read_file(path)?)
        .with_context(|| format!("{} is not a canonical logic signature", path.display()))
}

fn decode_args(args: &[String]) -> Result<Vec<Vec<u8>>> {
    args.iter()
        .map(|a| hex::decode(a).with_context(|| format!("argument {a:?} is not hex")))
        .collect()
}

fn load_multisig(args: &MultisigArgs) -> Result<MultisigAccount> {
    let keys = args.members.iter().map(|a| a.public_key()).collect();
    MultisigAccount::new(args.msig_version, args.threshold, keys)
        .context("invalid multisig parameters")
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn account(cmd: AccountCommand) -> Result<()> {
    match cmd {
        AccountCommand::New => {
            let kp = Keypair::generate();
            println!("address:  {}", kp.address());
            println!("mnemonic: {}", mnemonic::from_keypair(&kp));
        }
        AccountCommand::Import(key) => {
            let kp = load_keypair(&key)?;
            println!("{}", kp.address());
        }
    }
    Ok(())
}

fn address(cmd: AddressCommand) -> Result<()> {
    match cmd {
        AddressCommand::Multisig(args) => println!("{}", load_multisig(&args)?.address()),
        AddressCommand::Program { program } => {
            let program = read_file(&program)?;
            println!("{}", logicsig::program_address(&program));
        }
    }
    Ok(())
}

fn pay(args: PayArgs) -> Result<()> {
    let params = load_params(&args.params)?;
    let payment = Payment {
        close_remainder_to: args.close_to,
        ..Payment::new(args.to, args.amount)
    };
    let mut builder =
        TransactionBuilder::new(&params, args.from, TransactionKind::Payment(payment));
    if let Some(fee) = args.fee {
        builder = builder.flat_fee(fee);
    }
    if let Some(note) = args.note {
        builder = builder.note(note.into_bytes());
    }
    if let Some(lease) = args.lease {
        let lease: [u8; 32] = hex::decode(&lease)
            .context("lease is not hex")?
            .try_into()
            .map_err(|b: Vec<u8>| anyhow::anyhow!("lease must be 32 bytes, got {}", b.len()))?;
        builder = builder.lease(lease);
    }
    if let Some(rekey) = args.rekey_to {
        builder = builder.rekey_to(rekey);
    }
    if let Some(validity) = args.validity {
        builder = builder.last_valid(params.first_valid.saturating_add(validity));
    }

    let tx = builder.build()?;
    write_file(&args.out, &tx.encode())?;
    println!("{}", tx.id());
    Ok(())
}

fn sign(args: SignArgs) -> Result<()> {
    let tx = load_transaction(&args.tx)?;
    let kp = load_keypair(&args.key)?;
    let stx = transaction::sign_transaction(&kp, &tx);
    write_file(&args.out, &stx.to_bytes())?;
    println!("{}", stx.id());
    Ok(())
}

fn msig(cmd: MsigCommand) -> Result<()> {
    match cmd {
        MsigCommand::Sign {
            tx,
            account,
            key,
            out,
        } => {
            let tx = load_transaction(&tx)?;
            let account = load_multisig(&account)?;
            let kp = load_keypair(&key)?;
            let stx = multisig::sign_multisig_transaction(&kp, &account, &tx)?;
            write_file(&out, &stx.to_bytes())?;
            println!("{}", stx.id());
        }
        MsigCommand::Append {
            envelope,
            account,
            key,
            out,
        } => {
            let bytes = read_file(&envelope)?;
            let account = load_multisig(&account)?;
            let kp = load_keypair(&key)?;
            let appended = multisig::append_multisig_transaction(&kp, &account, &bytes)?;
            write_file(&out, &appended)?;
        }
        MsigCommand::Merge { envelopes, out } => {
            let parts = envelopes
                .iter()
                .map(|p| read_file(p))
                .collect::<Result<Vec<_>>>()?;
            let merged = multisig::merge_multisig_transactions(&parts)?;
            write_file(&out, &merged)?;
        }
    }
    Ok(())
}

fn lsig(cmd: LsigCommand) -> Result<()> {
    match cmd {
        LsigCommand::Create {
            program,
            args,
            delegate_mnemonic_file,
            out,
        } => {
            let mut lsig = LogicSig::new(read_file(&program)?, decode_args(&args)?)?;
            if let Some(mnemonic_file) = delegate_mnemonic_file {
                let kp = load_keypair(&KeyArgs { mnemonic_file })?;
                lsig.sign_delegated(&kp)?;
            }
            write_file(&out, &codec::to_vec(&lsig))?;
            match lsig.address() {
                Some(addr) => println!("{addr}"),
                None => println!("delegated"),
            }
        }
        LsigCommand::Msig {
            program,
            args,
            lsig,
            account,
            key,
            out,
        } => {
            let account = load_multisig(&account)?;
            let kp = load_keypair(&key)?;
            let lsig = match (lsig, program) {
                (Some(existing), _) => {
                    let mut lsig = load_logicsig(&existing)?;
                    lsig.append_multisig(&kp, &account)?;
                    lsig
                }
                (None, Some(program)) => {
                    let mut lsig = LogicSig::new(read_file(&program)?, decode_args(&args)?)?;
                    lsig.sign_multisig_delegated(&kp, &account)?;
                    lsig
                }
                (None, None) => bail!("either --program or --lsig is required"),
            };
            write_file(&out, &codec::to_vec(&lsig))?;
            println!("{}", account.address());
        }
        LsigCommand::Sign { lsig, tx, out } => {
            let lsig = load_logicsig(&lsig)?;
            let tx = load_transaction(&tx)?;
            let stx = logicsig::sign_logicsig_transaction(&lsig, &tx)?;
            write_file(&out, &stx.to_bytes())?;
            println!("{}", stx.id());
        }
    }
    Ok(())
}

fn group(args: GroupArgs) -> Result<()> {
    let txs = args
        .txs
        .iter()
        .map(|p| load_transaction(p))
        .collect::<Result<Vec<_>>>()?;
    let grouped = transaction::assign_group_id(&txs)?;
    for (path, tx) in args.txs.iter().zip(&grouped) {
        let mut out = path.clone().into_os_string();
        out.push(".");
        out.push(&args.suffix);
        write_file(&PathBuf::from(out), &tx.encode())?;
    }
    if let Some(gid) = grouped.first().and_then(|tx| tx.header.group) {
        println!("{}", BASE64.encode(gid));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inspect
// ---------------------------------------------------------------------------

fn inspect(path: &Path) -> Result<()> {
    let bytes = read_file(path)?;
    // Envelopes always carry "txn", so try them first.
    let report = match SignedTransaction::from_bytes(&bytes) {
        Ok(stx) => envelope_json(&stx),
        Err(envelope_err) => match Transaction::decode(&bytes) {
            Ok(tx) => transaction_json(&tx),
            Err(_) => bail!(
                "{} is neither an envelope nor a transaction: {envelope_err}",
                path.display()
            ),
        },
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn transaction_json(tx: &Transaction) -> Json {
    let h = &tx.header;
    let mut out = json!({
        "id": tx.id(),
        "type": tx.tx_type().tag(),
        "sender": h.sender,
        "fee": h.fee,
        "first-valid": h.first_valid,
        "last-valid": h.last_valid,
        "genesis-id": h.genesis_id,
        "genesis-hash": BASE64.encode(h.genesis_hash),
    });
    if !h.note.is_empty() {
        out["note"] = json!(BASE64.encode(&h.note));
    }
    if let Some(group) = h.group {
        out["group"] = json!(BASE64.encode(group));
    }
    if let Some(rekey) = h.rekey_to {
        out["rekey-to"] = json!(rekey);
    }
    if let TransactionKind::Payment(p) = &tx.kind {
        out["receiver"] = json!(p.receiver);
        out["amount"] = json!(p.amount);
        if let Some(close) = p.close_remainder_to {
            out["close-to"] = json!(close);
        }
    }
    out
}

fn envelope_json(stx: &SignedTransaction) -> Json {
    let mut out = json!({ "txn": transaction_json(&stx.transaction) });
    if let Some(auth) = stx.auth_address {
        out["auth-addr"] = json!(auth);
    }
    out["authorization"] = match &stx.authorization {
        None => json!("none"),
        Some(Authorization::Single(sig)) => json!({ "sig": sig.to_hex() }),
        Some(Authorization::Multisig(msig)) => json!({
            "msig": {
                "version": msig.version,
                "threshold": msig.threshold,
                "signed": msig.signed_count(),
                "members": msig.subsigs.len(),
            }
        }),
        Some(Authorization::Logic(lsig)) => json!({
            "lsig": {
                "program-len": lsig.program().len(),
                "args": lsig.args.len(),
                "delegation": match lsig.delegation() {
                    Delegation::None => "none",
                    Delegation::Single(_) => "single",
                    Delegation::Multisig(_) => "multisig",
                },
            }
        }),
    };
    out["verified"] = match transaction::verify_signed_transaction(stx) {
        Ok(()) => json!(true),
        Err(e) => json!(e.to_string()),
    };
    out
}

fn print_version() {
    println!("algo-tx {}", env!("CARGO_PKG_VERSION"));
    println!(
        "signatures: {}, digests: {}",
        algo_protocol::config::SIGNING_ALGORITHM,
        algo_protocol::config::PRIMARY_HASH_FUNCTION,
    );
}
