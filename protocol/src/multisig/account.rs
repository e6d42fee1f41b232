//! Multisig accounts and their partial signatures.

use crate::codec::{Decode, DecodeError, Encode, FieldReader, FieldWriter};
use crate::config::{MAX_MULTISIG_MEMBERS, MULTISIG_VERSION};
use crate::crypto::hash::{domain_hash_multi, HashDomain};
use crate::crypto::keys::{Keypair, PublicKey, Signature};
use crate::crypto::signatures::{sign_in_domain, verify_in_domain};
use crate::identity::Address;

use super::MultisigError;

/// A k-of-n account over an ordered list of Ed25519 keys.
///
/// Order is part of the identity: the same keys in a different order make a
/// different address. A key may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigAccount {
    version: u8,
    threshold: u8,
    public_keys: Vec<PublicKey>,
}

impl MultisigAccount {
    /// # Errors
    ///
    /// [`MultisigError::UnsupportedVersion`] unless `version` is 1;
    /// [`MultisigError::InvalidMemberCount`] outside 1..=255 keys;
    /// [`MultisigError::InvalidThreshold`] outside 1..=n.
    pub fn new(
        version: u8,
        threshold: u8,
        public_keys: Vec<PublicKey>,
    ) -> Result<Self, MultisigError> {
        if version != MULTISIG_VERSION {
            return Err(MultisigError::UnsupportedVersion(version));
        }
        let members = public_keys.len();
        if members == 0 || members > MAX_MULTISIG_MEMBERS {
            return Err(MultisigError::InvalidMemberCount(members));
        }
        if threshold == 0 || usize::from(threshold) > members {
            return Err(MultisigError::InvalidThreshold { threshold, members });
        }
        Ok(Self {
            version,
            threshold,
            public_keys,
        })
    }

    /// Recover the account a (partial) signature was made for.
    pub fn from_signature(msig: &MultisigSignature) -> Result<Self, MultisigError> {
        Self::new(
            msig.version,
            msig.threshold,
            msig.subsigs.iter().map(|s| s.public_key).collect(),
        )
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.public_keys.contains(public_key)
    }

    /// `SHA-512/256("MultisigAddr" || version || threshold || pk_1 || ... || pk_n)`.
    pub fn address(&self) -> Address {
        let mut parts: Vec<&[u8]> = Vec::with_capacity(self.public_keys.len() + 2);
        let version = [self.version];
        let threshold = [self.threshold];
        parts.push(&version);
        parts.push(&threshold);
        parts.extend(self.public_keys.iter().map(|pk| pk.as_bytes().as_slice()));
        Address::new(domain_hash_multi(HashDomain::MultisigAddress, &parts))
    }

    /// A signature for this account with every slot empty.
    pub fn blank_signature(&self) -> MultisigSignature {
        MultisigSignature {
            version: self.version,
            threshold: self.threshold,
            subsigs: self
                .public_keys
                .iter()
                .map(|pk| MultisigSubsig {
                    public_key: *pk,
                    signature: None,
                })
                .collect(),
        }
    }
}

/// One slot of a multisig signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSubsig {
    pub public_key: PublicKey,
    pub signature: Option<Signature>,
}

impl Encode for MultisigSubsig {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.public_key("pk", &self.public_key);
        w.signature("s", self.signature.as_ref());
    }
}

impl Decode for MultisigSubsig {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            public_key: r.public_key("pk")?,
            signature: r.signature("s")?,
        })
    }
}

/// A possibly partial multisig signature: one slot per member, in member
/// order.
///
/// Wire form: `{subsig: [{pk, s?}, ...], thr, v}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSignature {
    pub version: u8,
    pub threshold: u8,
    pub subsigs: Vec<MultisigSubsig>,
}

impl MultisigSignature {
    /// Number of filled slots.
    pub fn signed_count(&self) -> usize {
        self.subsigs.iter().filter(|s| s.signature.is_some()).count()
    }

    pub fn meets_threshold(&self) -> bool {
        self.signed_count() >= usize::from(self.threshold)
    }

    /// True if `account` has the same version, threshold and keys.
    pub fn matches(&self, account: &MultisigAccount) -> bool {
        self.version == account.version
            && self.threshold == account.threshold
            && self.subsigs.len() == account.public_keys.len()
            && self
                .subsigs
                .iter()
                .zip(&account.public_keys)
                .all(|(s, pk)| s.public_key == *pk)
    }

    /// Sign `domain || message` with `keypair` into every slot it owns.
    /// Returns the slot indices written.
    pub(crate) fn sign_slots(
        &mut self,
        keypair: &Keypair,
        domain: HashDomain,
        message: &[u8],
    ) -> Result<Vec<usize>, MultisigError> {
        let public_key = keypair.public_key();
        let slots: Vec<usize> = self
            .subsigs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.public_key == public_key)
            .map(|(i, _)| i)
            .collect();
        if slots.is_empty() {
            return Err(MultisigError::UnknownSigner);
        }

        let sig = sign_in_domain(keypair, domain, message);
        if let Some(&index) = slots
            .iter()
            .find(|&&i| self.subsigs[i].signature.is_some_and(|s| s != sig))
        {
            return Err(MultisigError::SlotConflict { index });
        }
        for &index in &slots {
            self.subsigs[index].signature = Some(sig);
        }
        Ok(slots)
    }

    /// Fold `other`'s filled slots into `self`. Both must be for the same
    /// account.
    pub(crate) fn merge_from(&mut self, other: &MultisigSignature) -> Result<(), MultisigError> {
        if self.version != other.version
            || self.threshold != other.threshold
            || self.subsigs.len() != other.subsigs.len()
            || self
                .subsigs
                .iter()
                .zip(&other.subsigs)
                .any(|(a, b)| a.public_key != b.public_key)
        {
            return Err(MultisigError::ParameterMismatch);
        }
        for (index, (mine, theirs)) in self.subsigs.iter_mut().zip(&other.subsigs).enumerate() {
            match (&mine.signature, &theirs.signature) {
                (Some(a), Some(b)) if a != b => return Err(MultisigError::SlotConflict { index }),
                (None, Some(b)) => mine.signature = Some(*b),
                _ => {}
            }
        }
        Ok(())
    }

    /// Check every filled slot against `domain || message`.
    ///
    /// Says nothing about the threshold; see [`Self::meets_threshold`].
    pub fn verify_slots(&self, domain: HashDomain, message: &[u8]) -> Result<(), MultisigError> {
        for (index, subsig) in self.subsigs.iter().enumerate() {
            if let Some(sig) = &subsig.signature {
                if !verify_in_domain(&subsig.public_key, domain, message, sig) {
                    return Err(MultisigError::SignatureInvalid { index });
                }
            }
        }
        Ok(())
    }
}

impl Encode for MultisigSignature {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.record_list("subsig", &self.subsigs);
        w.uint("thr", u64::from(self.threshold));
        w.uint("v", u64::from(self.version));
    }
}

fn small_uint(field: &str, value: u64) -> Result<u8, DecodeError> {
    u8::try_from(value).map_err(|_| DecodeError::InvalidValue {
        field: field.to_owned(),
        reason: format!("{value} does not fit in one byte"),
    })
}

impl Decode for MultisigSignature {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            subsigs: r.record_list("subsig")?,
            threshold: small_uint("thr", r.uint("thr")?)?,
            version: small_uint("v", r.uint("v")?)?,
        })
    }
}
