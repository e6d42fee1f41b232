//! # Multisig Module
//!
//! k-of-n accounts over an ordered list of Ed25519 keys.
//!
//! ```text
//! account.rs — MultisigAccount, MultisigSignature, per-slot signing and checks
//! engine.rs  — sign / append / merge over canonical envelope bytes
//! ```
//!
//! The account's address is a tagged hash of its parameters, so nobody holds
//! a key for it. A transaction from that address is authorized by a
//! multisig signature with at least `threshold` valid slots.

pub mod account;
pub mod engine;

use thiserror::Error;

use crate::codec::DecodeError;

pub use account::{MultisigAccount, MultisigSignature, MultisigSubsig};
pub use engine::{
    append_multisig_transaction, merge_multisig_transactions, sign_multisig_transaction,
};

/// Errors from building or combining multisig signatures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MultisigError {
    #[error("unsupported multisig version {0}")]
    UnsupportedVersion(u8),

    #[error("a multisig account holds 1 to 255 keys, got {0}")]
    InvalidMemberCount(usize),

    #[error("threshold {threshold} is outside 1..={members}")]
    InvalidThreshold { threshold: u8, members: usize },

    #[error("signer is not a member of the multisig account")]
    UnknownSigner,

    #[error("multisig parameters do not match")]
    ParameterMismatch,

    #[error("slot {index} already holds a different signature")]
    SlotConflict { index: usize },

    #[error("envelopes wrap different transactions")]
    TransactionMismatch,

    #[error("envelopes name different authorizing addresses")]
    AuthorizerMismatch,

    #[error("signature in slot {index} does not verify")]
    SignatureInvalid { index: usize },

    #[error("envelope is not multisig-authorized")]
    NotMultisig,

    #[error("merging needs at least two envelopes, got {0}")]
    NotEnoughEnvelopes(usize),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
