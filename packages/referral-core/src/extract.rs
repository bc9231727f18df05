//! Change-set extraction.
//!
//! Resolves a grid change-set against the snapshot it was made on and
//! produces concrete row operations. Extraction is pure: it never touches a
//! store, and a bad index aborts the whole extraction.

use crate::changeset::ChangeSet;
use crate::error::ReconcileError;
use crate::referral::{Referral, ReferralFields, ReferralId};
use crate::store::Snapshot;

/// A row-level operation ready to be applied to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOp {
    /// Replace the payload of an existing row with this full row
    Update(Referral),
    /// Append a new row; the store assigns its id
    Insert(ReferralFields),
    /// Remove the row with this id
    Delete(ReferralId),
}

/// Converts a change-set into row operations.
///
/// Updates come first in ascending index order, then inserts and deletes in
/// the order they appear in the change-set.
///
/// # Arguments
/// * `snapshot` - The exact snapshot the grid was rendered from
/// * `changes` - Pending edits against that snapshot
///
/// # Returns
/// `Result<Vec<RowOp>, ReconcileError>`; fails with `IndexOutOfRange` if an
/// edited or deleted index is not in the snapshot.
pub fn extract(snapshot: &Snapshot, changes: &ChangeSet) -> Result<Vec<RowOp>, ReconcileError> {
    let mut ops = Vec::with_capacity(changes.len());

    for (&index, patch) in &changes.edited_rows {
        let mut row = row_at(snapshot, index)?.clone();
        patch.apply_to(&mut row.fields);
        ops.push(RowOp::Update(row));
    }

    ops.extend(changes.added_rows.iter().cloned().map(RowOp::Insert));

    for &index in &changes.deleted_rows {
        ops.push(RowOp::Delete(row_at(snapshot, index)?.id));
    }

    Ok(ops)
}

fn row_at(snapshot: &Snapshot, index: usize) -> Result<&Referral, ReconcileError> {
    snapshot.get(index).ok_or(ReconcileError::IndexOutOfRange {
        index,
        len: snapshot.len(),
    })
}
