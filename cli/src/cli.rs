//! # CLI Interface
//!
//! Defines the command-line argument structure for `algo-tx` using `clap`
//! derive. Transactions and envelopes move between invocations as files of
//! canonical bytes, so a multisig can be passed around co-signers by mail.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use algo_protocol::config::MULTISIG_VERSION;
use algo_protocol::identity::Address;

use crate::logging::LogFormat;

/// Offline transaction construction and signing.
///
/// Nothing here talks to a node. Suggested parameters come in as a JSON
/// file; signed envelopes go out as files ready for submission.
#[derive(Parser, Debug)]
#[command(
    name = "algo-tx",
    about = "Offline transaction construction and signing",
    version,
    propagate_version = true
)]
pub struct AlgoTxCli {
    /// Log output format.
    #[arg(long, global = true, env = "ALGO_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or restore an account key.
    #[command(subcommand)]
    Account(AccountCommand),
    /// Derive the address of a multisig account or a program.
    #[command(subcommand)]
    Address(AddressCommand),
    /// Build an unsigned payment transaction.
    Pay(PayArgs),
    /// Sign a transaction with a single key.
    Sign(SignArgs),
    /// Sign, append to, or merge multisig envelopes.
    #[command(subcommand)]
    Msig(MsigCommand),
    /// Create logic signatures and sign transactions with them.
    #[command(subcommand)]
    Lsig(LsigCommand),
    /// Decode a transaction or envelope file and print it as JSON.
    Inspect(InspectArgs),
    /// Link transaction files into an atomic group.
    Group(GroupArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Generate a fresh key and print its address and mnemonic.
    New,
    /// Print the address of the key a mnemonic backs up.
    Import(KeyArgs),
}

#[derive(Subcommand, Debug)]
pub enum AddressCommand {
    /// Address of a multisig account.
    Multisig(MultisigArgs),
    /// Address of a program's own account.
    Program {
        /// Compiled program bytes.
        #[arg(long)]
        program: PathBuf,
    },
}

/// Where a signing key comes from.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// File holding the signer's 25-word mnemonic.
    #[arg(long, env = "ALGO_MNEMONIC_FILE")]
    pub mnemonic_file: PathBuf,
}

/// Parameters of a multisig account.
#[derive(Args, Debug)]
pub struct MultisigArgs {
    /// Multisig version.
    #[arg(long = "msig-version", default_value_t = MULTISIG_VERSION)]
    pub msig_version: u8,

    /// Signatures required.
    #[arg(long)]
    pub threshold: u8,

    /// Member addresses, in account order. Repeat the flag per member.
    #[arg(long = "member", required = true)]
    pub members: Vec<Address>,
}

/// Arguments for the `pay` subcommand.
#[derive(Args, Debug)]
pub struct PayArgs {
    /// Suggested parameters: the node's "transaction params" JSON.
    #[arg(long, env = "ALGO_PARAMS_FILE")]
    pub params: PathBuf,

    #[arg(long)]
    pub from: Address,

    #[arg(long)]
    pub to: Address,

    /// Amount in base units.
    #[arg(long)]
    pub amount: u64,

    /// Use this exact fee instead of the per-byte fee.
    #[arg(long)]
    pub fee: Option<u64>,

    /// UTF-8 note.
    #[arg(long)]
    pub note: Option<String>,

    /// Close the sender's account to this address.
    #[arg(long)]
    pub close_to: Option<Address>,

    /// Hex-encoded 32-byte lease.
    #[arg(long)]
    pub lease: Option<String>,

    #[arg(long)]
    pub rekey_to: Option<Address>,

    /// Rounds the transaction stays valid for.
    #[arg(long)]
    pub validity: Option<u64>,

    /// Output file for the unsigned transaction.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

/// Arguments for the `sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Unsigned transaction file.
    #[arg(long)]
    pub tx: PathBuf,

    #[command(flatten)]
    pub key: KeyArgs,

    /// Output file for the signed envelope.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum MsigCommand {
    /// Start a multisig envelope with one member's signature.
    Sign {
        #[arg(long)]
        tx: PathBuf,
        #[command(flatten)]
        account: MultisigArgs,
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Add one member's signature to an existing envelope.
    Append {
        #[arg(long)]
        envelope: PathBuf,
        #[command(flatten)]
        account: MultisigArgs,
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Combine envelopes signed independently by different members.
    Merge {
        /// Envelope files. Repeat the flag per file.
        #[arg(long = "envelope", required = true, num_args = 1..)]
        envelopes: Vec<PathBuf>,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum LsigCommand {
    /// Wrap a program and its arguments, optionally delegating a key.
    Create {
        /// Compiled program bytes.
        #[arg(long)]
        program: PathBuf,
        /// Hex-encoded program argument. Repeat the flag per argument.
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Delegate the account of this mnemonic to the program.
        #[arg(long)]
        delegate_mnemonic_file: Option<PathBuf>,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Delegate a multisig account to a program, one member at a time.
    ///
    /// With `--program`, starts a new delegation; with `--lsig`, adds this
    /// member's signature to an existing one.
    Msig {
        /// Compiled program bytes.
        #[arg(long, required_unless_present = "lsig", conflicts_with = "lsig")]
        program: Option<PathBuf>,
        /// Hex-encoded program argument. Repeat the flag per argument.
        #[arg(long = "arg", conflicts_with = "lsig")]
        args: Vec<String>,
        /// Multisig-delegated logic signature to add to.
        #[arg(long)]
        lsig: Option<PathBuf>,
        #[command(flatten)]
        account: MultisigArgs,
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
    /// Authorize a transaction with a logic signature.
    Sign {
        #[arg(long)]
        lsig: PathBuf,
        #[arg(long)]
        tx: PathBuf,
        #[arg(long, short = 'o')]
        out: PathBuf,
    },
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Transaction or envelope file.
    pub file: PathBuf,
}

/// Arguments for the `group` subcommand.
#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Unsigned transaction files, in group order.
    #[arg(required = true, num_args = 1..)]
    pub txs: Vec<PathBuf>,

    /// Suffix appended to each input path for the grouped output.
    #[arg(long, default_value = "grouped")]
    pub suffix: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        AlgoTxCli::command().debug_assert();
    }

    #[test]
    fn parses_multisig_members() {
        let zero = Address::ZERO.to_string();
        let cli = AlgoTxCli::try_parse_from([
            "algo-tx",
            "address",
            "multisig",
            "--threshold",
            "1",
            "--member",
            zero.as_str(),
            "--member",
            zero.as_str(),
        ])
        .unwrap();
        match cli.command {
            Commands::Address(AddressCommand::Multisig(args)) => {
                assert_eq!(args.msig_version, 1);
                assert_eq!(args.members.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lsig_msig_takes_program_or_existing_lsig() {
        let zero = Address::ZERO.to_string();
        let base = [
            "algo-tx",
            "lsig",
            "msig",
            "--threshold",
            "1",
            "--member",
            zero.as_str(),
            "--mnemonic-file",
            "key.txt",
            "-o",
            "out.lsig",
        ];
        let with = |extra: &[&str]| {
            AlgoTxCli::try_parse_from(base.iter().chain(extra).copied().collect::<Vec<_>>())
        };

        let cli = with(&["--program", "p.teal", "--arg", "00ff"]).unwrap();
        match cli.command {
            Commands::Lsig(LsigCommand::Msig {
                program, args, lsig, ..
            }) => {
                assert_eq!(program, Some(PathBuf::from("p.teal")));
                assert_eq!(args, vec!["00ff".to_string()]);
                assert!(lsig.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(with(&["--lsig", "prev.lsig"]).is_ok());
        assert!(with(&[]).is_err());
        assert!(with(&["--program", "p.teal", "--lsig", "prev.lsig"]).is_err());
    }

    #[test]
    fn rejects_bad_address() {
        assert!(AlgoTxCli::try_parse_from([
            "algo-tx", "pay", "--params", "p.json", "--from", "nope", "--to", "nope",
            "--amount", "1", "-o", "out.tx",
        ])
        .is_err());
    }
}
