//! Pending grid edits scoped to one commit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::referral::{ReferralFields, ReferralPatch};

/// One user-initiated batch of pending edits against a snapshot.
///
/// Indices in `edited_rows` and `deleted_rows` are positions in the snapshot
/// the grid was rendered from, never positions after other edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeSet {
    /// Snapshot index to the columns changed on that row
    pub edited_rows: BTreeMap<usize, ReferralPatch>,
    /// Appended rows, in grid order
    pub added_rows: Vec<ReferralFields>,
    /// Snapshot indices marked for removal, in the order they were marked
    pub deleted_rows: Vec<usize>,
}

impl ChangeSet {
    /// Creates an empty change-set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one edit, insert or delete is pending.
    pub fn has_uncommitted_changes(&self) -> bool {
        !self.edited_rows.is_empty() || !self.added_rows.is_empty() || !self.deleted_rows.is_empty()
    }

    /// Records an edit, folding it into any earlier edit of the same row.
    pub fn edit_row(&mut self, index: usize, patch: ReferralPatch) {
        if patch.is_empty() {
            return;
        }
        match self.edited_rows.get_mut(&index) {
            Some(existing) => existing.merge(patch),
            None => {
                self.edited_rows.insert(index, patch);
            }
        }
    }

    /// Appends a new row.
    pub fn add_row(&mut self, fields: ReferralFields) {
        self.added_rows.push(fields);
    }

    /// Marks a row for removal. Marking the same row twice is a no-op.
    pub fn delete_row(&mut self, index: usize) {
        if !self.deleted_rows.contains(&index) {
            self.deleted_rows.push(index);
        }
    }

    /// Total number of pending operations.
    pub fn len(&self) -> usize {
        self.edited_rows.len() + self.added_rows.len() + self.deleted_rows.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        !self.has_uncommitted_changes()
    }

    /// Drops all pending edits.
    pub fn clear(&mut self) {
        self.edited_rows.clear();
        self.added_rows.clear();
        self.deleted_rows.clear();
    }
}
