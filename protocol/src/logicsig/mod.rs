//! # LogicSig Module
//!
//! Transactions authorized by a program instead of (or as well as) a key.
//!
//! A logic signature carries the program bytes, the arguments it runs with,
//! and one of three delegation modes:
//!
//! 1. **None** -- the program's own account (`SHA-512/256("Program" || program)`)
//!    is the sender. Whoever holds the program can spend from it, subject to
//!    what the program approves.
//! 2. **Single** -- a key holder signs `"Program" || program`, delegating
//!    their account to the program.
//! 3. **Multisig** -- members of a multisig account sign the same message,
//!    delegating the multisig account.
//!
//! Running the program is the network's job. This module only assembles
//! and checks the signatures around it.

use thiserror::Error;
use tracing::debug;

use crate::codec::{Decode, DecodeError, Encode, FieldReader, FieldWriter};
use crate::crypto::hash::{domain_hash, HashDomain};
use crate::crypto::keys::{Keypair, Signature};
use crate::crypto::signatures::{sign_in_domain, verify_in_domain};
use crate::identity::Address;
use crate::multisig::{MultisigAccount, MultisigError, MultisigSignature};
use crate::transaction::signing::auth_address_for;
use crate::transaction::{Authorization, SignedTransaction, Transaction};

/// Errors from building or checking a logic signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogicSigError {
    #[error("program is empty")]
    EmptyProgram,

    #[error("logic signature is already delegated in another mode")]
    ModeConflict,

    #[error("logic signature does not authorize {expected}")]
    AddressMismatch { expected: Address },

    #[error("delegation signature does not verify")]
    SignatureInvalid,

    #[error("{signed} of {threshold} required multisig signatures present")]
    InsufficientSignatures { signed: usize, threshold: u8 },

    #[error(transparent)]
    Multisig(#[from] MultisigError),
}

/// The address of a program's own account.
pub fn program_address(program: &[u8]) -> Address {
    Address::new(domain_hash(HashDomain::Program, program))
}

/// Who, if anyone, has delegated their account to the program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Delegation {
    #[default]
    None,
    Single(Signature),
    Multisig(MultisigSignature),
}

/// A program plus its arguments and optional delegation.
///
/// Wire form: `{arg?, l, msig?, sig?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicSig {
    program: Vec<u8>,
    pub args: Vec<Vec<u8>>,
    delegation: Delegation,
}

impl LogicSig {
    pub fn new(program: Vec<u8>, args: Vec<Vec<u8>>) -> Result<Self, LogicSigError> {
        if program.is_empty() {
            return Err(LogicSigError::EmptyProgram);
        }
        Ok(Self {
            program,
            args,
            delegation: Delegation::None,
        })
    }

    pub fn program(&self) -> &[u8] {
        &self.program
    }

    pub fn delegation(&self) -> &Delegation {
        &self.delegation
    }

    pub fn is_delegated(&self) -> bool {
        !matches!(self.delegation, Delegation::None)
    }

    /// Delegate `keypair`'s account to this program.
    pub fn sign_delegated(&mut self, keypair: &Keypair) -> Result<(), LogicSigError> {
        if matches!(self.delegation, Delegation::Multisig(_)) {
            return Err(LogicSigError::ModeConflict);
        }
        let sig = sign_in_domain(keypair, HashDomain::Program, &self.program);
        debug!(signer = %keypair.address(), "logicsig delegated");
        self.delegation = Delegation::Single(sig);
        Ok(())
    }

    /// Start a multisig delegation of `account`, signed by one member.
    pub fn sign_multisig_delegated(
        &mut self,
        keypair: &Keypair,
        account: &MultisigAccount,
    ) -> Result<(), LogicSigError> {
        if self.is_delegated() {
            return Err(LogicSigError::ModeConflict);
        }
        let mut msig = account.blank_signature();
        let slots = msig.sign_slots(keypair, HashDomain::Program, &self.program)?;
        debug!(signer = %keypair.address(), ?slots, "logicsig multisig delegated");
        self.delegation = Delegation::Multisig(msig);
        Ok(())
    }

    /// Add another member's signature to a multisig delegation.
    pub fn append_multisig(
        &mut self,
        keypair: &Keypair,
        account: &MultisigAccount,
    ) -> Result<(), LogicSigError> {
        let Delegation::Multisig(msig) = &mut self.delegation else {
            return Err(LogicSigError::ModeConflict);
        };
        if !msig.matches(account) {
            return Err(MultisigError::ParameterMismatch.into());
        }
        let slots = msig.sign_slots(keypair, HashDomain::Program, &self.program)?;
        debug!(
            signer = %keypair.address(),
            ?slots,
            signed = msig.signed_count(),
            "logicsig multisig appended"
        );
        Ok(())
    }

    /// The account this logic signature can authorize, where it names one.
    ///
    /// A single-key delegation carries only the signature, not the key, so
    /// its account is whichever sender the signature verifies against.
    pub fn address(&self) -> Option<Address> {
        match &self.delegation {
            Delegation::None => Some(program_address(&self.program)),
            Delegation::Single(_) => None,
            Delegation::Multisig(msig) => MultisigAccount::from_signature(msig)
                .ok()
                .map(|a| a.address()),
        }
    }

    /// Check that this logic signature may authorize `authorizer`.
    ///
    /// # Errors
    ///
    /// - [`LogicSigError::EmptyProgram`] for an empty program.
    /// - [`LogicSigError::AddressMismatch`] if the program (mode none) or the
    ///   multisig account does not hash to `authorizer`.
    /// - [`LogicSigError::SignatureInvalid`] if a single delegation does not
    ///   verify under `authorizer`'s key.
    /// - [`LogicSigError::Multisig`] if a multisig slot does not verify.
    /// - [`LogicSigError::InsufficientSignatures`] below the threshold.
    pub fn verify(&self, authorizer: &Address) -> Result<(), LogicSigError> {
        if self.program.is_empty() {
            return Err(LogicSigError::EmptyProgram);
        }
        let mismatch = || LogicSigError::AddressMismatch {
            expected: *authorizer,
        };
        match &self.delegation {
            Delegation::None => {
                if program_address(&self.program) != *authorizer {
                    return Err(mismatch());
                }
            }
            Delegation::Single(sig) => {
                if !verify_in_domain(
                    &authorizer.public_key(),
                    HashDomain::Program,
                    &self.program,
                    sig,
                ) {
                    return Err(LogicSigError::SignatureInvalid);
                }
            }
            Delegation::Multisig(msig) => {
                let account = MultisigAccount::from_signature(msig)?;
                if account.address() != *authorizer {
                    return Err(mismatch());
                }
                msig.verify_slots(HashDomain::Program, &self.program)?;
                if !msig.meets_threshold() {
                    return Err(LogicSigError::InsufficientSignatures {
                        signed: msig.signed_count(),
                        threshold: msig.threshold,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Encode for LogicSig {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.bytes_list("arg", &self.args);
        w.bytes("l", &self.program);
        match &self.delegation {
            Delegation::None => {}
            Delegation::Single(sig) => w.signature("sig", Some(sig)),
            Delegation::Multisig(msig) => w.record("msig", msig),
        }
    }
}

impl Decode for LogicSig {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        let args = r.bytes_list("arg")?;
        let program = r.bytes("l")?;
        if program.is_empty() {
            return Err(DecodeError::InvalidValue {
                field: "l".into(),
                reason: "logic signature carries no program".into(),
            });
        }
        let msig = r.record::<MultisigSignature>("msig")?;
        let sig = r.signature("sig")?;
        let delegation = match (sig, msig) {
            (None, None) => Delegation::None,
            (Some(sig), None) => Delegation::Single(sig),
            (None, Some(msig)) => Delegation::Multisig(msig),
            (Some(_), Some(_)) => {
                return Err(DecodeError::InvalidValue {
                    field: "sig".into(),
                    reason: "logic signature is delegated twice".into(),
                })
            }
        };
        Ok(Self {
            program,
            args,
            delegation,
        })
    }
}

/// Wrap `tx` in an envelope authorized by `lsig`.
///
/// The logic signature is checked against the authorizer first: the
/// account `lsig` names, or the sender for a single-key delegation. When
/// that account is not the sender it is recorded as the authorizer.
pub fn sign_logicsig_transaction(
    lsig: &LogicSig,
    tx: &Transaction,
) -> Result<SignedTransaction, LogicSigError> {
    let authorizer = lsig.address().unwrap_or(tx.header.sender);
    lsig.verify(&authorizer)?;
    debug!(tx_id = %tx.id(), authorizer = %authorizer, "logicsig transaction");
    Ok(SignedTransaction {
        transaction: tx.clone(),
        authorization: Some(Authorization::Logic(lsig.clone())),
        auth_address: auth_address_for(tx, authorizer),
    })
}
