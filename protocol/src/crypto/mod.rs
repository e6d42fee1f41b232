//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers around audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for every signature.
//! - **SHA-512/256** (`sha2`) for IDs, checksums and derived addresses.
//!
//! Domain separation lives here too: [`HashDomain`] is the closed list of
//! contexts a hash or signature can be computed in.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{domain_hash, sha512_256, HashDomain};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
pub use signatures::{sign_bytes, sign_in_domain, verify_bytes, verify_in_domain};
