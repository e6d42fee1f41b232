//! # Identity Module
//!
//! The human-facing forms of account keys:
//!
//! 1. **Address** — 32-byte account identifier with a 4-byte checksum,
//!    base32-encoded to 58 characters. What users paste into payment fields.
//! 2. **Mnemonic** — 25-word backup phrase for a 32-byte seed or wallet
//!    master derivation key. What users write on paper.
//!
//! Key pairs themselves live in [`crate::crypto::keys`] and are re-exported
//! here for convenience.

pub mod address;
pub mod mnemonic;

pub use crate::crypto::keys::{Keypair, PublicKey, Signature};
pub use address::{Address, AddressError};
pub use mnemonic::MnemonicError;
