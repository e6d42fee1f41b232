//! # Protocol Configuration & Constants
//!
//! Every magic number the encoder and signers depend on lives here. These
//! values are shared with every other implementation of the protocol, so a
//! change here is a change to the wire format. Don't.

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 for every signature in the protocol.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Signing key (seed) length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Public (verifying) key length in bytes.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// SHA-512/256 is the only hash used for IDs, checksums and derivations.
pub const PRIMARY_HASH_FUNCTION: &str = "SHA-512/256";

/// Hash output length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Text Encodings
// ---------------------------------------------------------------------------

/// Trailing bytes of `SHA-512/256(pk)` appended to the key before base32.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// Length of an address string: base32 of 36 bytes, no padding.
pub const ADDRESS_STRING_LENGTH: usize = 58;

/// Length of a transaction ID string: base32 of a 32-byte digest, no padding.
pub const TX_ID_STRING_LENGTH: usize = 52;

/// Number of words in a mnemonic phrase, checksum word included.
pub const MNEMONIC_WORD_COUNT: usize = 25;

/// Bits carried by one mnemonic word. 2^11 = 2048 dictionary entries.
pub const MNEMONIC_BITS_PER_WORD: usize = 11;

// ---------------------------------------------------------------------------
// Domain Separation Tags
// ---------------------------------------------------------------------------

/// Prefix for transaction IDs and transaction signatures.
pub const TAG_TRANSACTION: &[u8] = b"TX";

/// Prefix for the transaction group digest.
pub const TAG_TX_GROUP: &[u8] = b"TG";

/// Prefix for multisig address derivation.
pub const TAG_MULTISIG_ADDRESS: &[u8] = b"MultisigAddr";

/// Prefix for program addresses and delegated program signatures.
pub const TAG_PROGRAM: &[u8] = b"Program";

/// Prefix for arbitrary data signed with an account key.
pub const TAG_BYTES: &[u8] = b"MX";

// ---------------------------------------------------------------------------
// Multisig
// ---------------------------------------------------------------------------

/// The only multisig version the protocol defines.
pub const MULTISIG_VERSION: u8 = 1;

/// Maximum number of member keys in a multisig account. Version and
/// threshold are serialized as single bytes in the address preimage.
pub const MAX_MULTISIG_MEMBERS: usize = 255;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of transactions in one atomic group.
pub const MAX_TX_GROUP_SIZE: usize = 16;

/// Minimum fee per transaction, in microunits.
pub const MIN_TX_FEE: u64 = 1_000;

/// Validity window applied when building params from a node's last round.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1_000;

/// Maximum note length in bytes.
pub const MAX_NOTE_LENGTH: usize = 1_024;

/// Maximum nesting depth the strict decoder will follow. Real envelopes
/// nest four levels deep (envelope, lsig, msig, subsig).
pub const MAX_DECODE_DEPTH: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(SIGNING_KEY_LENGTH, 32);
        assert_eq!(VERIFYING_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(HASH_OUTPUT_LENGTH, 32);
    }

    #[test]
    fn test_text_lengths_follow_base32() {
        // base32 packs 5 bits per character, rounding up without padding.
        let addr_bits = (VERIFYING_KEY_LENGTH + ADDRESS_CHECKSUM_LENGTH) * 8;
        assert_eq!(addr_bits.div_ceil(5), ADDRESS_STRING_LENGTH);
        assert_eq!((HASH_OUTPUT_LENGTH * 8).div_ceil(5), TX_ID_STRING_LENGTH);
    }

    #[test]
    fn test_mnemonic_covers_key_plus_checksum() {
        let data_words = MNEMONIC_WORD_COUNT - 1;
        assert!(data_words * MNEMONIC_BITS_PER_WORD >= SIGNING_KEY_LENGTH * 8);
        assert!((data_words - 1) * MNEMONIC_BITS_PER_WORD < SIGNING_KEY_LENGTH * 8);
    }

    #[test]
    fn test_domain_tags_are_distinct() {
        let tags = [
            TAG_TRANSACTION,
            TAG_TX_GROUP,
            TAG_MULTISIG_ADDRESS,
            TAG_PROGRAM,
            TAG_BYTES,
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_multisig_limits_fit_in_a_byte() {
        assert!(MAX_MULTISIG_MEMBERS <= u8::MAX as usize);
        assert!(MULTISIG_VERSION >= 1);
    }
}
