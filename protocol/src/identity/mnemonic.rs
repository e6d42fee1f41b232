//! # Mnemonic Backup Phrases
//!
//! Encodes 32 bytes of key material as 25 words from the BIP-39 English
//! list. The first 24 words carry the key, 11 bits each, packed
//! least-significant bit first. Word 24 holds the last 3 key bits; its
//! other 8 bits are padding and must be zero. Word 25 is a checksum: the first 11-bit group of
//! `SHA-512/256(key)`.
//!
//! ```text
//! key (256 bits) -> 24 x 11-bit groups (264 bits, 8 zero padding bits)
//! SHA-512/256(key)[0..2] -> first 11-bit group -> checksum word
//! ```
//!
//! The same encoding backs up account seeds and wallet master derivation
//! keys. Only the interpretation of the 32 bytes differs.

use bip39::Language;
use thiserror::Error;

use crate::config::{MNEMONIC_BITS_PER_WORD, MNEMONIC_WORD_COUNT, SIGNING_KEY_LENGTH};
use crate::crypto::hash::sha512_256;
use crate::crypto::keys::Keypair;

const WORD_MASK: u32 = (1 << MNEMONIC_BITS_PER_WORD) - 1;

/// Errors from decoding a mnemonic phrase.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("expected {expected} words, got {got}")]
    InvalidWordCount { expected: usize, got: usize },

    #[error("word {0:?} is not in the dictionary")]
    UnknownWord(String),

    #[error("padding bits after the key are not zero")]
    InvalidPadding,

    #[error("checksum word does not match the key")]
    ChecksumMismatch,
}

/// Regroup a byte string into 11-bit values, least-significant bit first.
/// A trailing partial group is zero-extended.
pub(crate) fn to_u11(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity((bytes.len() * 8).div_ceil(MNEMONIC_BITS_PER_WORD));
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for byte in bytes {
        buffer |= u32::from(*byte) << bits;
        bits += 8;
        if bits >= MNEMONIC_BITS_PER_WORD {
            out.push((buffer & WORD_MASK) as u16);
            buffer >>= MNEMONIC_BITS_PER_WORD;
            bits -= MNEMONIC_BITS_PER_WORD;
        }
    }
    if bits > 0 {
        out.push((buffer & WORD_MASK) as u16);
    }
    out
}

/// Inverse of [`to_u11`]: concatenate 11-bit values into bytes.
pub(crate) fn from_u11(groups: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity((groups.len() * MNEMONIC_BITS_PER_WORD).div_ceil(8));
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for group in groups {
        buffer |= u32::from(*group) << bits;
        bits += MNEMONIC_BITS_PER_WORD;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push((buffer & 0xff) as u8);
    }
    out
}

fn checksum_index(key: &[u8; 32]) -> u16 {
    let digest = sha512_256(key);
    to_u11(&digest[..2])[0]
}

/// Encode 32 bytes as a 25-word phrase.
pub fn from_key(key: &[u8; 32]) -> String {
    let words = Language::English.word_list();
    let mut groups = to_u11(key);
    groups.push(checksum_index(key));
    groups
        .iter()
        .map(|g| words[usize::from(*g)])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a 25-word phrase back to the 32 bytes it encodes.
pub fn to_key(phrase: &str) -> Result<[u8; 32], MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORD_COUNT {
        return Err(MnemonicError::InvalidWordCount {
            expected: MNEMONIC_WORD_COUNT,
            got: words.len(),
        });
    }

    let groups = words
        .iter()
        .map(|w| {
            Language::English
                .find_word(w)
                .ok_or_else(|| MnemonicError::UnknownWord((*w).to_owned()))
        })
        .collect::<Result<Vec<u16>, _>>()?;

    let (data, checksum) = groups.split_at(MNEMONIC_WORD_COUNT - 1);
    let mut bytes = from_u11(data);
    // 24 words are 264 bits: the key plus one byte of padding.
    if bytes.len() != SIGNING_KEY_LENGTH + 1 || bytes[SIGNING_KEY_LENGTH] != 0 {
        return Err(MnemonicError::InvalidPadding);
    }
    bytes.truncate(SIGNING_KEY_LENGTH);

    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    if checksum[0] != checksum_index(&key) {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(key)
}

/// Back up an account key as a mnemonic.
pub fn from_keypair(keypair: &Keypair) -> String {
    from_key(&keypair.to_bytes())
}

/// Restore an account key from its mnemonic.
pub fn to_keypair(phrase: &str) -> Result<Keypair, MnemonicError> {
    Ok(Keypair::from_seed(&to_key(phrase)?))
}

/// Back up a wallet master derivation key.
pub fn from_master_derivation_key(mdk: &[u8; 32]) -> String {
    from_key(mdk)
}

/// Restore a wallet master derivation key.
pub fn to_master_derivation_key(phrase: &str) -> Result<[u8; 32], MnemonicError> {
    to_key(phrase)
}
