//! # Addresses
//!
//! An address is 32 bytes: an Ed25519 public key, or the digest that stands
//! in for one (multisig and program accounts). Its text form appends a
//! checksum and base32-encodes the result:
//!
//! ```text
//! payload (32 bytes)
//!     -> checksum = SHA-512/256(payload)[28..32]
//!     -> base32(payload || checksum), no padding -> 58 characters
//! ```
//!
//! The checksum catches typos before a payment goes to a key nobody holds.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ADDRESS_CHECKSUM_LENGTH, ADDRESS_STRING_LENGTH, HASH_OUTPUT_LENGTH};
use crate::crypto::hash::sha512_256;
use crate::crypto::keys::PublicKey;

/// Errors from parsing an address string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address length: expected {expected} characters, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("address is not valid base32")]
    InvalidEncoding,

    #[error("address checksum does not match")]
    InvalidChecksum,
}

/// A 32-byte account address.
///
/// # Examples
///
/// ```
/// use algo_protocol::crypto::Keypair;
/// use algo_protocol::identity::Address;
///
/// let kp = Keypair::generate();
/// let addr = Address::from_public_key(&kp.public_key());
/// let text = addr.to_string();
/// assert_eq!(text.len(), 58);
/// assert_eq!(text.parse::<Address>().unwrap(), addr);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// The all-zero address. The codec treats it as "not set".
    pub const ZERO: Address = Address([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_public_key(pk: &PublicKey) -> Self {
        Self(*pk.as_bytes())
    }

    /// Parse the 58-character text form, verifying the checksum.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.len() != ADDRESS_STRING_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_STRING_LENGTH,
                got: s.len(),
            });
        }
        let decoded = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| AddressError::InvalidEncoding)?;
        if decoded.len() != HASH_OUTPUT_LENGTH + ADDRESS_CHECKSUM_LENGTH {
            return Err(AddressError::InvalidEncoding);
        }

        let (payload, checksum) = decoded.split_at(HASH_OUTPUT_LENGTH);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(payload);
        let addr = Self(bytes);
        if addr.checksum() != checksum {
            return Err(AddressError::InvalidChecksum);
        }
        Ok(addr)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The payload read as an Ed25519 public key. Only meaningful for
    /// single-key accounts.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn checksum(&self) -> [u8; ADDRESS_CHECKSUM_LENGTH] {
        let digest = sha512_256(&self.0);
        let mut out = [0u8; ADDRESS_CHECKSUM_LENGTH];
        out.copy_from_slice(&digest[HASH_OUTPUT_LENGTH - ADDRESS_CHECKSUM_LENGTH..]);
        out
    }

    /// Encode as the 58-character text form.
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(HASH_OUTPUT_LENGTH + ADDRESS_CHECKSUM_LENGTH);
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&buf)
    }
}

impl From<PublicKey> for Address {
    fn from(pk: PublicKey) -> Self {
        Self::from_public_key(&pk)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.encode())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::parse(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                serde::de::Error::custom(format!("expected 32 address bytes, got {}", bytes.len()))
            })?;
            Ok(Address(arr))
        }
    }
}
