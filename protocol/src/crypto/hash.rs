//! # Hashing Utilities
//!
//! One hash function, SHA-512/256, and a closed set of domain tags.
//!
//! Every digest the protocol computes over structured data is taken over
//! `tag || message`, where the tag names the context the bytes live in.
//! Transaction IDs, group IDs, multisig addresses and program addresses all
//! use different tags, so the same bytes can never mean two things. Call
//! sites pick a [`HashDomain`] variant; nobody writes prefix literals inline.
//!
//! The plain [`sha512_256`] is reserved for the two places that hash raw key
//! bytes without a tag: address checksums and mnemonic checksums.

use sha2::{Digest, Sha512_256};

use crate::config;

/// Domain-separation contexts for hashing and signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Transaction IDs and transaction signatures (`"TX"`).
    Transaction,
    /// The digest linking an ordered set of transactions (`"TG"`).
    TxGroup,
    /// Multisig address derivation (`"MultisigAddr"`).
    MultisigAddress,
    /// Program addresses and delegated program signatures (`"Program"`).
    Program,
    /// Arbitrary data signed by an account (`"MX"`).
    Bytes,
}

impl HashDomain {
    /// The literal prefix written in front of the message.
    pub fn tag(self) -> &'static [u8] {
        match self {
            Self::Transaction => config::TAG_TRANSACTION,
            Self::TxGroup => config::TAG_TX_GROUP,
            Self::MultisigAddress => config::TAG_MULTISIG_ADDRESS,
            Self::Program => config::TAG_PROGRAM,
            Self::Bytes => config::TAG_BYTES,
        }
    }

    /// Returns `tag || message` as one buffer, ready for signing.
    pub fn prefixed(self, message: &[u8]) -> Vec<u8> {
        let tag = self.tag();
        let mut buf = Vec::with_capacity(tag.len() + message.len());
        buf.extend_from_slice(tag);
        buf.extend_from_slice(message);
        buf
    }
}

/// Compute SHA-512/256 of the input.
///
/// # Example
///
/// ```
/// use algo_protocol::crypto::sha512_256;
///
/// let digest = sha512_256(b"");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-512/256 over `domain.tag() || data` without concatenating.
pub fn domain_hash(domain: HashDomain, data: &[u8]) -> [u8; 32] {
    domain_hash_multi(domain, &[data])
}

/// Domain-separated hash over several parts fed in order.
pub fn domain_hash_multi(domain: HashDomain, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(domain.tag());
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
