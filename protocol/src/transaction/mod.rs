//! # Transaction Module
//!
//! Construction, canonical encoding, grouping, signing and verification of
//! ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Variant payloads (Payment, AssetConfig, ...) and TxType
//! params.rs       — SuggestedParams, FeePolicy, the node's JSON shape
//! builder.rs      — Header, Transaction, TransactionBuilder, transaction IDs
//! group.rs        — Group ids for atomic transaction groups
//! signing.rs      — SignedTransaction envelope and single-key signing
//! verification.rs — TransactionError and envelope verification
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] from [`SuggestedParams`].
//! 2. **Group** (optional) — [`assign_group_id`] over the ordered members.
//! 3. **Sign** — [`sign_transaction`], or the multisig and logicsig engines.
//! 4. **Submit** — hand [`SignedTransaction::to_bytes`] to the network layer.
//!
//! ## Design Decisions
//!
//! - Transaction IDs are `SHA-512/256("TX" || canonical bytes)`, base32
//!   without padding. The same prefixed bytes are what gets signed, so the
//!   ID is fixed before signing and never changes after.
//! - All amounts and rounds are `u64`. No floating point anywhere near
//!   monetary values.
//! - Header and payload share one flat map on the wire; the `type` field
//!   picks the payload's field table.

pub mod builder;
pub mod group;
pub mod params;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{compute_id, Header, Transaction, TransactionBuilder, TransactionKind};
pub use group::{assign_group_id, compute_group_id};
pub use params::{FeePolicy, NodeParams, SuggestedParams};
pub use signing::{sign_transaction, verify_signature, Authorization, SignedTransaction};
pub use types::{
    ApplicationCall, AssetConfig, AssetFreeze, AssetParams, AssetTransfer, KeyRegistration,
    OnCompletion, Payment, StateSchema, TxType,
};
pub use verification::{verify_signed_transaction, TransactionError};
