// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Algo Protocol — Offline Transaction Core
//!
//! Everything needed to turn intent into bytes a node will accept, without
//! talking to a node: keys and addresses, a canonical encoding, transaction
//! construction, and the three ways of authorizing a transaction (a single
//! key, a multisig account, a logic signature).
//!
//! Ed25519 for signatures, SHA-512/256 for every digest, and a strict
//! MessagePack subset for every byte string that gets hashed or signed.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants: lengths, limits, domain tags.
//! - **crypto** — Ed25519 keys, SHA-512/256, domain-separated signing.
//! - **codec** — The canonical encoding. One writer, one strict reader.
//! - **identity** — Addresses and 25-word mnemonics.
//! - **transaction** — Building, grouping, signing and verifying.
//! - **multisig** — k-of-n accounts; sign, append, merge.
//! - **logicsig** — Program accounts and program delegation.
//!
//! ## Design Philosophy
//!
//! 1. Byte-exact or bust. Another implementation hashes what we emit.
//! 2. No I/O and no global state. Every operation is a pure function of
//!    its inputs; keys are borrowed per call and never stored.
//! 3. Every hash and signature names its domain. No bare messages.
//! 4. If it touches money, it has tests. Plural.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod logicsig;
pub mod multisig;
pub mod transaction;
