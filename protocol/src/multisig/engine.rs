//! Collecting multisig signatures on a transaction.
//!
//! Partially signed envelopes travel between co-signers as canonical bytes.
//! Each co-signer either appends to an envelope they received, or signs
//! independently and someone merges the results. None of these steps look
//! at the threshold: an envelope may leave here with fewer signatures than
//! the account needs.

use tracing::debug;

use super::account::{MultisigAccount, MultisigSignature};
use super::MultisigError;
use crate::crypto::keys::Keypair;
use crate::crypto::HashDomain;
use crate::transaction::signing::auth_address_for;
use crate::transaction::{Authorization, SignedTransaction, Transaction};

/// Sign `tx` as one member of `account`.
///
/// The envelope carries only this member's slot(s). If the account is not
/// the sender, its address is recorded as the authorizer.
pub fn sign_multisig_transaction(
    keypair: &Keypair,
    account: &MultisigAccount,
    tx: &Transaction,
) -> Result<SignedTransaction, MultisigError> {
    let mut msig = account.blank_signature();
    let slots = msig.sign_slots(keypair, HashDomain::Transaction, &tx.encode())?;
    debug!(
        tx_id = %tx.id(),
        signer = %keypair.address(),
        ?slots,
        "multisig signed"
    );
    Ok(SignedTransaction {
        transaction: tx.clone(),
        authorization: Some(Authorization::Multisig(msig)),
        auth_address: auth_address_for(tx, account.address()),
    })
}

fn multisig_of(stx: &SignedTransaction) -> Result<&MultisigSignature, MultisigError> {
    match &stx.authorization {
        Some(Authorization::Multisig(msig)) => Ok(msig),
        _ => Err(MultisigError::NotMultisig),
    }
}

/// Add `keypair`'s signature to a partially signed envelope.
///
/// # Errors
///
/// - [`MultisigError::Decode`] if `envelope` is not canonical.
/// - [`MultisigError::NotMultisig`] if it carries another kind of authorization.
/// - [`MultisigError::ParameterMismatch`] if it was made for a different account.
/// - [`MultisigError::UnknownSigner`] if `keypair` is not a member.
/// - [`MultisigError::SlotConflict`] if the member's slot already holds a
///   different signature.
pub fn append_multisig_transaction(
    keypair: &Keypair,
    account: &MultisigAccount,
    envelope: &[u8],
) -> Result<Vec<u8>, MultisigError> {
    let mut stx = SignedTransaction::from_bytes(envelope)?;
    let mut msig = multisig_of(&stx)?.clone();
    if !msig.matches(account) {
        return Err(MultisigError::ParameterMismatch);
    }

    let slots = msig.sign_slots(keypair, HashDomain::Transaction, &stx.transaction.encode())?;
    debug!(
        tx_id = %stx.id(),
        signer = %keypair.address(),
        ?slots,
        signed = msig.signed_count(),
        "multisig appended"
    );
    stx.authorization = Some(Authorization::Multisig(msig));
    Ok(stx.to_bytes())
}

/// Combine independently signed envelopes of the same transaction.
///
/// Every filled slot of the result is checked against the transaction.
///
/// # Errors
///
/// - [`MultisigError::NotEnoughEnvelopes`] for fewer than two inputs.
/// - [`MultisigError::TransactionMismatch`] if the transactions differ.
/// - [`MultisigError::ParameterMismatch`] if the accounts differ.
/// - [`MultisigError::SlotConflict`] if two envelopes fill a slot differently.
/// - [`MultisigError::AuthorizerMismatch`] if the recorded authorizers differ.
/// - [`MultisigError::SignatureInvalid`] if a merged slot does not verify.
pub fn merge_multisig_transactions<B: AsRef<[u8]>>(
    envelopes: &[B],
) -> Result<Vec<u8>, MultisigError> {
    if envelopes.len() < 2 {
        return Err(MultisigError::NotEnoughEnvelopes(envelopes.len()));
    }

    let decoded = envelopes
        .iter()
        .map(|e| SignedTransaction::from_bytes(e.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let (first, rest) = decoded
        .split_first()
        .ok_or(MultisigError::NotEnoughEnvelopes(0))?;

    let mut merged = multisig_of(first)?.clone();
    for other in rest {
        if other.transaction != first.transaction {
            return Err(MultisigError::TransactionMismatch);
        }
        merged.merge_from(multisig_of(other)?)?;
        if other.auth_address != first.auth_address {
            return Err(MultisigError::AuthorizerMismatch);
        }
    }

    let message = first.transaction.encode();
    merged.verify_slots(HashDomain::Transaction, &message)?;
    debug!(
        tx_id = %first.id(),
        inputs = decoded.len(),
        signed = merged.signed_count(),
        "multisig merged"
    );

    Ok(SignedTransaction {
        transaction: first.transaction.clone(),
        authorization: Some(Authorization::Multisig(merged)),
        auth_address: first.auth_address,
    }
    .to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Signature;
    use crate::identity::Address;
    use crate::transaction::params::{FeePolicy, SuggestedParams};
    use crate::transaction::TransactionBuilder;

    struct Fixture {
        a: Keypair,
        b: Keypair,
        account: MultisigAccount,
        tx: Transaction,
    }

    fn fixture() -> Fixture {
        let a = Keypair::from_seed(&[1u8; 32]);
        let b = Keypair::from_seed(&[2u8; 32]);
        let account = MultisigAccount::new(1, 1, vec![a.public_key(), b.public_key()]).unwrap();
        let params = SuggestedParams {
            fee: FeePolicy::Flat(1_000),
            first_valid: 1,
            last_valid: 1_001,
            genesis_hash: [7u8; 32],
            genesis_id: "devnet-v1".into(),
        };
        let tx = TransactionBuilder::payment(&params, account.address(), Address::new([9u8; 32]), 1)
            .build()
            .unwrap();
        Fixture { a, b, account, tx }
    }

    fn msig(bytes: &[u8]) -> MultisigSignature {
        match SignedTransaction::from_bytes(bytes).unwrap().authorization {
            Some(Authorization::Multisig(m)) => m,
            other => panic!("expected multisig, got {other:?}"),
        }
    }

    #[test]
    fn sign_fills_only_own_slot() {
        let f = fixture();
        let stx = sign_multisig_transaction(&f.a, &f.account, &f.tx).unwrap();
        let m = msig(&stx.to_bytes());
        assert!(m.subsigs[0].signature.is_some());
        assert!(m.subsigs[1].signature.is_none());
        assert!(stx.auth_address.is_none());
    }

    #[test]
    fn sign_then_append() {
        let f = fixture();
        let partial = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let full = append_multisig_transaction(&f.b, &f.account, &partial).unwrap();
        let m = msig(&full);
        assert_eq!(m.signed_count(), 2);
        assert!(m
            .verify_slots(HashDomain::Transaction, &f.tx.encode())
            .is_ok());
    }

    #[test]
    fn merge_matches_append() {
        let f = fixture();
        let from_a = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let from_b = sign_multisig_transaction(&f.b, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let merged = merge_multisig_transactions(&[from_a.clone(), from_b]).unwrap();
        let appended = append_multisig_transaction(&f.b, &f.account, &from_a).unwrap();
        assert_eq!(merged, appended);
    }

    #[test]
    fn appending_twice_is_idempotent() {
        let f = fixture();
        let once = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let twice = append_multisig_transaction(&f.a, &f.account, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn non_member_cannot_sign() {
        let f = fixture();
        let outsider = Keypair::from_seed(&[3u8; 32]);
        assert_eq!(
            sign_multisig_transaction(&outsider, &f.account, &f.tx).unwrap_err(),
            MultisigError::UnknownSigner
        );
    }

    #[test]
    fn append_checks_account() {
        let f = fixture();
        let partial = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let other =
            MultisigAccount::new(1, 2, vec![f.a.public_key(), f.b.public_key()]).unwrap();
        assert_eq!(
            append_multisig_transaction(&f.b, &other, &partial),
            Err(MultisigError::ParameterMismatch)
        );
    }

    #[test]
    fn append_rejects_single_sig_envelope() {
        let f = fixture();
        let single = crate::transaction::sign_transaction(&f.a, &f.tx).to_bytes();
        assert_eq!(
            append_multisig_transaction(&f.b, &f.account, &single),
            Err(MultisigError::NotMultisig)
        );
    }

    #[test]
    fn merge_rejects_different_transactions() {
        let f = fixture();
        let mut other_tx = f.tx.clone();
        other_tx.header.note = b"different".to_vec();
        let a = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let b = sign_multisig_transaction(&f.b, &f.account, &other_tx)
            .unwrap()
            .to_bytes();
        assert_eq!(
            merge_multisig_transactions(&[a, b]),
            Err(MultisigError::TransactionMismatch)
        );
    }

    #[test]
    fn merge_rejects_forged_slot() {
        let f = fixture();
        let a = sign_multisig_transaction(&f.a, &f.account, &f.tx).unwrap();
        let mut forged = a.clone();
        if let Some(Authorization::Multisig(m)) = &mut forged.authorization {
            // Slot 1 claims b's key but carries a's signature.
            m.subsigs[1].signature = m.subsigs[0].signature;
        }
        assert_eq!(
            merge_multisig_transactions(&[a.to_bytes(), forged.to_bytes()]),
            Err(MultisigError::SignatureInvalid { index: 1 })
        );
    }

    #[test]
    fn merge_needs_two_envelopes() {
        let f = fixture();
        let a = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        assert_eq!(
            merge_multisig_transactions(&[a]),
            Err(MultisigError::NotEnoughEnvelopes(1))
        );
    }

    #[test]
    fn merge_accepts_more_than_two() {
        let c = Keypair::from_seed(&[3u8; 32]);
        let f = fixture();
        let account = MultisigAccount::new(
            1,
            3,
            vec![f.a.public_key(), f.b.public_key(), c.public_key()],
        )
        .unwrap();
        let parts: Vec<Vec<u8>> = [&f.a, &f.b, &c]
            .iter()
            .map(|kp| {
                sign_multisig_transaction(kp, &account, &f.tx)
                    .unwrap()
                    .to_bytes()
            })
            .collect();
        let merged = merge_multisig_transactions(&parts).unwrap();
        let m = msig(&merged);
        assert_eq!(m.signed_count(), 3);
        assert!(m.meets_threshold());
        // The account is not the sender here.
        let stx = SignedTransaction::from_bytes(&merged).unwrap();
        assert_eq!(stx.auth_address, Some(account.address()));
    }

    /// `stx` with slot `index` holding a signature over something else.
    fn with_foreign_signature(mut stx: SignedTransaction, index: usize) -> SignedTransaction {
        if let Some(Authorization::Multisig(m)) = &mut stx.authorization {
            m.subsigs[index].signature = Some(Signature::from_bytes([5u8; 64]));
        }
        stx
    }

    #[test]
    fn append_refuses_to_overwrite_a_slot() {
        let f = fixture();
        let tampered = with_foreign_signature(
            sign_multisig_transaction(&f.a, &f.account, &f.tx).unwrap(),
            0,
        );
        assert_eq!(
            append_multisig_transaction(&f.a, &f.account, &tampered.to_bytes()),
            Err(MultisigError::SlotConflict { index: 0 })
        );
    }

    #[test]
    fn merge_rejects_conflicting_slot() {
        let f = fixture();
        let a = sign_multisig_transaction(&f.a, &f.account, &f.tx).unwrap();
        let tampered = with_foreign_signature(a.clone(), 0);
        assert_eq!(
            merge_multisig_transactions(&[a.to_bytes(), tampered.to_bytes()]),
            Err(MultisigError::SlotConflict { index: 0 })
        );
    }

    #[test]
    fn merge_rejects_different_accounts() {
        let f = fixture();
        let two_of_two =
            MultisigAccount::new(1, 2, vec![f.a.public_key(), f.b.public_key()]).unwrap();
        let x = sign_multisig_transaction(&f.a, &f.account, &f.tx)
            .unwrap()
            .to_bytes();
        let y = sign_multisig_transaction(&f.b, &two_of_two, &f.tx)
            .unwrap()
            .to_bytes();
        assert_eq!(
            merge_multisig_transactions(&[x, y]),
            Err(MultisigError::ParameterMismatch)
        );
    }

    #[test]
    fn merge_rejects_different_authorizers() {
        let f = fixture();
        let a = sign_multisig_transaction(&f.a, &f.account, &f.tx).unwrap();
        let mut b = sign_multisig_transaction(&f.b, &f.account, &f.tx).unwrap();
        b.auth_address = Some(Address::new([4u8; 32]));
        assert_eq!(
            merge_multisig_transactions(&[a.to_bytes(), b.to_bytes()]),
            Err(MultisigError::AuthorizerMismatch)
        );
    }
}
