//! Transaction signing and the signed-transaction envelope.
//!
//! Signing is a separate step from building because the keypair may not
//! be available at construction time (e.g., hardware wallet, remote signer).
//! The signed message is `"TX" || encode(tx)`; the envelope wraps the
//! transaction with exactly the authorization that signed it.

use tracing::debug;

use super::builder::Transaction;
use crate::codec::{self, Decode, DecodeError, Encode, FieldReader, FieldWriter};
use crate::crypto::keys::{Keypair, PublicKey, Signature};
use crate::crypto::signatures::{sign_in_domain, verify_in_domain};
use crate::crypto::HashDomain;
use crate::identity::Address;
use crate::logicsig::LogicSig;
use crate::multisig::MultisigSignature;

/// What authorizes an envelope's transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Single(Signature),
    Multisig(MultisigSignature),
    Logic(LogicSig),
}

/// A transaction plus its authorization, ready to submit.
///
/// Wire form: `{lsig?, msig?, sgnr?, sig?, txn}` with at most one of
/// `lsig`, `msig`, `sig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub authorization: Option<Authorization>,
    /// The address that authorized the transaction, when it is not the
    /// sender (the sender has been rekeyed).
    pub auth_address: Option<Address>,
}

impl SignedTransaction {
    /// Canonical envelope bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::from_slice(bytes)
    }

    /// The ID of the wrapped transaction. Signing never changes it.
    pub fn id(&self) -> String {
        self.transaction.id()
    }

    /// The address whose authorization this envelope must carry.
    pub fn authorizer(&self) -> Address {
        self.auth_address.unwrap_or(self.transaction.header.sender)
    }

    pub fn is_signed(&self) -> bool {
        self.authorization.is_some()
    }
}

/// Omit the authorizing address when it is the sender.
pub(crate) fn auth_address_for(tx: &Transaction, signer: Address) -> Option<Address> {
    (signer != tx.header.sender).then_some(signer)
}

impl Encode for SignedTransaction {
    fn encode_fields(&self, w: &mut FieldWriter) {
        match &self.authorization {
            Some(Authorization::Single(sig)) => w.signature("sig", Some(sig)),
            Some(Authorization::Multisig(msig)) => w.record("msig", msig),
            Some(Authorization::Logic(lsig)) => w.record("lsig", lsig),
            None => {}
        }
        w.opt_address("sgnr", self.auth_address.as_ref());
        w.record("txn", &self.transaction);
    }
}

impl Decode for SignedTransaction {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        let lsig = r.record::<LogicSig>("lsig")?;
        let msig = r.record::<MultisigSignature>("msig")?;
        let sig = r.signature("sig")?;
        let authorization = match (sig, msig, lsig) {
            (None, None, None) => None,
            (Some(sig), None, None) => Some(Authorization::Single(sig)),
            (None, Some(msig), None) => Some(Authorization::Multisig(msig)),
            (None, None, Some(lsig)) => Some(Authorization::Logic(lsig)),
            _ => {
                return Err(DecodeError::InvalidValue {
                    field: "sig".into(),
                    reason: "envelope carries more than one authorization".into(),
                })
            }
        };
        let transaction = r
            .record::<Transaction>("txn")?
            .ok_or_else(|| DecodeError::InvalidValue {
                field: "txn".into(),
                reason: "envelope carries no transaction".into(),
            })?;
        Ok(Self {
            transaction,
            authorization,
            auth_address: r.address("sgnr")?,
        })
    }
}

/// Sign `tx` with a single key.
///
/// If the key's address is not the sender (a rekeyed account) the envelope
/// records it as the authorizing address.
///
/// # Example
///
/// ```
/// use algo_protocol::crypto::Keypair;
/// use algo_protocol::identity::Address;
/// use algo_protocol::transaction::{sign_transaction, FeePolicy, SuggestedParams, TransactionBuilder};
///
/// let kp = Keypair::generate();
/// let params = SuggestedParams {
///     fee: FeePolicy::Flat(1_000),
///     first_valid: 1,
///     last_valid: 100,
///     genesis_hash: [7u8; 32],
///     genesis_id: "devnet-v1".into(),
/// };
/// let tx = TransactionBuilder::payment(&params, kp.address(), Address::new([2u8; 32]), 10)
///     .build()
///     .unwrap();
///
/// let stx = sign_transaction(&kp, &tx);
/// assert_eq!(stx.id(), tx.id());
/// ```
pub fn sign_transaction(keypair: &Keypair, tx: &Transaction) -> SignedTransaction {
    let sig = sign_in_domain(keypair, HashDomain::Transaction, &tx.encode());
    let signer = keypair.address();
    debug!(tx_id = %tx.id(), signer = %signer, "signed transaction");
    SignedTransaction {
        transaction: tx.clone(),
        authorization: Some(Authorization::Single(sig)),
        auth_address: auth_address_for(tx, signer),
    }
}

/// True if `sig` is `public_key`'s signature over `tx`.
pub fn verify_signature(public_key: &PublicKey, tx: &Transaction, sig: &Signature) -> bool {
    verify_in_domain(public_key, HashDomain::Transaction, &tx.encode(), sig)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
