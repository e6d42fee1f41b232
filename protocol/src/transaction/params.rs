//! Suggested parameters: the network facts every transaction header needs.
//!
//! The node's "transaction params" endpoint returns a JSON document like
//!
//! ```json
//! {
//!   "consensus-version": "...",
//!   "fee": 0,
//!   "genesis-hash": "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
//!   "genesis-id": "testnet-v1.0",
//!   "last-round": 43210,
//!   "min-fee": 1000
//! }
//! ```
//!
//! [`NodeParams`] mirrors that document; [`SuggestedParams`] is what the
//! builder consumes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{DEFAULT_VALIDITY_WINDOW, MIN_TX_FEE};

/// How the builder sets the header's fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// Use this exact fee.
    Flat(u64),
    /// Pay per byte of the signed transaction, but never less than
    /// `min_fee`.
    PerByte { fee_per_byte: u64, min_fee: u64 },
}

impl FeePolicy {
    /// Resolve the fee for a signed transaction of `size` bytes.
    pub fn resolve(&self, size: usize) -> u64 {
        match *self {
            FeePolicy::Flat(fee) => fee,
            FeePolicy::PerByte {
                fee_per_byte,
                min_fee,
            } => fee_per_byte.saturating_mul(size as u64).max(min_fee),
        }
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy::PerByte {
            fee_per_byte: 0,
            min_fee: MIN_TX_FEE,
        }
    }
}

/// Network parameters for building a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    pub fee: FeePolicy,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_hash: [u8; 32],
    pub genesis_id: String,
}

impl SuggestedParams {
    /// Same network and rounds, with a flat fee.
    pub fn with_flat_fee(mut self, fee: u64) -> Self {
        self.fee = FeePolicy::Flat(fee);
        self
    }
}

/// The node's JSON response, field for field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub consensus_version: String,
    /// Fee per byte.
    pub fee: u64,
    #[serde(default = "default_min_fee")]
    pub min_fee: u64,
    pub last_round: u64,
    #[serde(with = "genesis_hash_base64")]
    pub genesis_hash: [u8; 32],
    pub genesis_id: String,
}

fn default_min_fee() -> u64 {
    MIN_TX_FEE
}

impl From<NodeParams> for SuggestedParams {
    fn from(p: NodeParams) -> Self {
        let first_valid = p.last_round;
        SuggestedParams {
            fee: FeePolicy::PerByte {
                fee_per_byte: p.fee,
                min_fee: p.min_fee,
            },
            first_valid,
            last_valid: first_valid.saturating_add(DEFAULT_VALIDITY_WINDOW),
            genesis_hash: p.genesis_hash,
            genesis_id: p.genesis_id,
        }
    }
}

mod genesis_hash_base64 {
    use super::*;

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(text.as_bytes()).map_err(serde::de::Error::custom)?;
        let got = bytes.len();
        bytes.try_into().map_err(|_| {
            serde::de::Error::custom(format!("genesis hash must be 32 bytes, got {got}"))
        })
    }
}
