//! Transaction errors and signed-envelope verification.
//!
//! [`verify_signed_transaction`] answers one question: does the envelope's
//! authorization come from the account allowed to authorize it? That
//! account is the recorded authorizer (`sgnr`) if present, else the sender.
//! Whether the account exists, has funds, or was actually rekeyed is ledger
//! state and out of reach here.

use thiserror::Error;

use super::signing::{Authorization, SignedTransaction};
use crate::codec::DecodeError;
use crate::crypto::HashDomain;
use crate::logicsig::LogicSigError;
use crate::multisig::{MultisigAccount, MultisigError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from building, grouping or verifying transactions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("first valid round {first} is after last valid round {last}")]
    InvalidValidityWindow { first: u64, last: u64 },

    #[error("note is {len} bytes, the maximum is {max}")]
    NoteTooLong { len: usize, max: usize },

    /// The strict empty address check found an unset asset role.
    #[error("strict empty address check: {role} address is empty")]
    EmptyAddress { role: &'static str },

    /// Params with nothing set would be omitted and read back as a destroy.
    #[error("asset config for asset {asset_id} carries empty params")]
    EmptyAssetParams { asset_id: u64 },

    #[error("a group needs at least one transaction")]
    EmptyGroup,

    #[error("group of {size} transactions exceeds the maximum of {max}")]
    GroupTooLarge { size: usize, max: usize },

    #[error("transaction {index} already belongs to a different group")]
    GroupConflict { index: usize },

    #[error("envelope carries no authorization")]
    MissingAuthorization,

    #[error("signature does not verify against the authorizing address")]
    SignatureInvalid,

    #[error("multisig account does not match the authorizing address")]
    MultisigAddressMismatch,

    #[error("{signed} of {threshold} required multisig signatures present")]
    InsufficientSignatures { signed: usize, threshold: u8 },

    #[error(transparent)]
    Multisig(#[from] MultisigError),

    #[error(transparent)]
    LogicSig(#[from] LogicSigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify the envelope's authorization against its authorizing address.
///
/// The checks, by kind:
///
/// 1. **Single** -- Ed25519 over `"TX" || encode(tx)` under the key the
///    authorizer's address holds.
/// 2. **Multisig** -- the account rebuilt from the signature must hash to
///    the authorizer; every filled slot must verify; the filled slots must
///    reach the threshold.
/// 3. **LogicSig** -- see [`crate::logicsig::LogicSig::verify`].
///
/// # Errors
///
/// Returns the first failing check as a [`TransactionError`].
pub fn verify_signed_transaction(stx: &SignedTransaction) -> Result<(), TransactionError> {
    let authorizer = stx.authorizer();
    let message = stx.transaction.encode();

    match &stx.authorization {
        None => Err(TransactionError::MissingAuthorization),
        Some(Authorization::Single(sig)) => {
            if authorizer
                .public_key()
                .verify(&HashDomain::Transaction.prefixed(&message), sig)
            {
                Ok(())
            } else {
                Err(TransactionError::SignatureInvalid)
            }
        }
        Some(Authorization::Multisig(msig)) => {
            let account = MultisigAccount::from_signature(msig)?;
            if account.address() != authorizer {
                return Err(TransactionError::MultisigAddressMismatch);
            }
            msig.verify_slots(HashDomain::Transaction, &message)?;
            if !msig.meets_threshold() {
                return Err(TransactionError::InsufficientSignatures {
                    signed: msig.signed_count(),
                    threshold: msig.threshold,
                });
            }
            Ok(())
        }
        Some(Authorization::Logic(lsig)) => Ok(lsig.verify(&authorizer)?),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::identity::Address;
    use crate::logicsig::{program_address, sign_logicsig_transaction, LogicSig};
    use crate::multisig::{
        append_multisig_transaction, sign_multisig_transaction, MultisigAccount,
    };
    use crate::transaction::params::{FeePolicy, SuggestedParams};
    use crate::transaction::{sign_transaction, Transaction, TransactionBuilder};

    fn tx_from(sender: Address) -> Transaction {
        let params = SuggestedParams {
            fee: FeePolicy::Flat(1_000),
            first_valid: 1,
            last_valid: 1_001,
            genesis_hash: [7u8; 32],
            genesis_id: "devnet-v1".into(),
        };
        TransactionBuilder::payment(&params, sender, Address::new([9u8; 32]), 1)
            .build()
            .unwrap()
    }

    #[test]
    fn valid_single_signature_passes() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let stx = sign_transaction(&kp, &tx_from(kp.address()));
        assert!(verify_signed_transaction(&stx).is_ok());
    }

    #[test]
    fn rekeyed_signature_checks_authorizer() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let mut stx = sign_transaction(&kp, &tx_from(Address::new([5u8; 32])));
        assert!(verify_signed_transaction(&stx).is_ok());

        // Dropping the authorizer makes the sender's key the expected one.
        stx.auth_address = None;
        assert_eq!(
            verify_signed_transaction(&stx),
            Err(TransactionError::SignatureInvalid)
        );
    }

    #[test]
    fn tampered_transaction_fails() {
        let kp = Keypair::from_seed(&[1u8; 32]);
        let mut stx = sign_transaction(&kp, &tx_from(kp.address()));
        stx.transaction.header.fee = 0;
        assert_eq!(
            verify_signed_transaction(&stx),
            Err(TransactionError::SignatureInvalid)
        );
    }

    #[test]
    fn unsigned_envelope_fails() {
        let stx = SignedTransaction {
            transaction: tx_from(Address::new([5u8; 32])),
            authorization: None,
            auth_address: None,
        };
        assert_eq!(
            verify_signed_transaction(&stx),
            Err(TransactionError::MissingAuthorization)
        );
    }

    #[test]
    fn multisig_needs_threshold() {
        let a = Keypair::from_seed(&[1u8; 32]);
        let b = Keypair::from_seed(&[2u8; 32]);
        let account = MultisigAccount::new(1, 2, vec![a.public_key(), b.public_key()]).unwrap();
        let tx = tx_from(account.address());

        let partial = sign_multisig_transaction(&a, &account, &tx).unwrap();
        assert_eq!(
            verify_signed_transaction(&partial),
            Err(TransactionError::InsufficientSignatures {
                signed: 1,
                threshold: 2
            })
        );

        let full = append_multisig_transaction(&b, &account, &partial.to_bytes()).unwrap();
        let full = SignedTransaction::from_bytes(&full).unwrap();
        assert!(verify_signed_transaction(&full).is_ok());
    }

    #[test]
    fn multisig_for_wrong_account_fails() {
        let a = Keypair::from_seed(&[1u8; 32]);
        let account = MultisigAccount::new(1, 1, vec![a.public_key()]).unwrap();
        let mut stx = sign_multisig_transaction(&a, &account, &tx_from(account.address())).unwrap();
        stx.transaction.header.sender = a.address();
        assert_eq!(
            verify_signed_transaction(&stx),
            Err(TransactionError::MultisigAddressMismatch)
        );
    }

    #[test]
    fn logicsig_escrow_verifies() {
        let lsig = LogicSig::new(vec![0x06, 0x81, 0x01], vec![]).unwrap();
        let stx = sign_logicsig_transaction(&lsig, &tx_from(program_address(lsig.program())))
            .unwrap();
        assert!(verify_signed_transaction(&stx).is_ok());

        let mut wrong = stx.clone();
        wrong.transaction.header.sender = Address::new([1u8; 32]);
        assert!(matches!(
            verify_signed_transaction(&wrong),
            Err(TransactionError::LogicSig(LogicSigError::AddressMismatch { .. }))
        ));
    }
}
