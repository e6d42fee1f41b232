//! Atomic transaction groups.
//!
//! A group id commits to an ordered list of transactions: either all of them
//! are confirmed or none is. Each member carries the same id in its `grp`
//! field, and the id is computed over the members without it:
//!
//! ```text
//! digest_i = SHA-512/256("TX" || encode(tx_i without grp))
//! group_id = SHA-512/256("TG" || encode({txlist: [digest_1, ..., digest_n]}))
//! ```

use tracing::debug;

use super::builder::Transaction;
use super::verification::TransactionError;
use crate::codec::{self, Encode, FieldWriter};
use crate::config::MAX_TX_GROUP_SIZE;
use crate::crypto::hash::{domain_hash, HashDomain};

struct TxGroup {
    txlist: Vec<[u8; 32]>,
}

impl Encode for TxGroup {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.fixed_list("txlist", &self.txlist);
    }
}

fn check_size(len: usize) -> Result<(), TransactionError> {
    if len == 0 {
        return Err(TransactionError::EmptyGroup);
    }
    if len > MAX_TX_GROUP_SIZE {
        return Err(TransactionError::GroupTooLarge {
            size: len,
            max: MAX_TX_GROUP_SIZE,
        });
    }
    Ok(())
}

/// The group id for `txs`, in order.
///
/// Any group id the inputs already carry is ignored, so the result is the
/// same before and after [`assign_group_id`].
pub fn compute_group_id(txs: &[Transaction]) -> Result<[u8; 32], TransactionError> {
    check_size(txs.len())?;
    let txlist = txs
        .iter()
        .map(|tx| tx.clone().with_group(None).raw_id())
        .collect();
    Ok(domain_hash(
        HashDomain::TxGroup,
        &codec::to_vec(&TxGroup { txlist }),
    ))
}

/// Compute the group id for `txs` and return copies carrying it.
///
/// # Errors
///
/// [`TransactionError::GroupConflict`] if a transaction already belongs to a
/// different group; [`TransactionError::EmptyGroup`] and
/// [`TransactionError::GroupTooLarge`] for sizes outside 1..=16.
pub fn assign_group_id(txs: &[Transaction]) -> Result<Vec<Transaction>, TransactionError> {
    let gid = compute_group_id(txs)?;
    if let Some(index) = txs
        .iter()
        .position(|tx| tx.header.group.is_some_and(|g| g != gid))
    {
        return Err(TransactionError::GroupConflict { index });
    }
    debug!(
        size = txs.len(),
        group = %hex::encode(gid),
        "assigned group id"
    );
    Ok(txs
        .iter()
        .map(|tx| tx.clone().with_group(Some(gid)))
        .collect())
}
