use std::collections::{HashMap, HashSet};

use crate::referral::{Referral, ReferralFields, ReferralId};

use super::change::Change;

/// Private copy of the referral table with a transaction's changes applied.
///
/// Changes are isolated from the committed rows until commit.
#[derive(Debug, Clone)]
pub struct StagingTable {
    /// Copy of the committed rows with staged changes applied
    pub rows: Vec<Referral>,
    /// Next id to assign on insert
    pub next_id: ReferralId,
    /// Changes staged in this transaction, in order
    pub changes: Vec<Change>,
}

impl StagingTable {
    /// Creates a staging table from the committed state.
    ///
    /// # Arguments
    /// * `rows` - Currently committed rows
    /// * `next_id` - Next id the store would assign
    pub fn new(rows: &[Referral], next_id: ReferralId) -> Self {
        Self {
            rows: rows.to_vec(),
            next_id,
            changes: Vec::new(),
        }
    }

    /// Stages payload replacements for rows matched by id.
    ///
    /// Rows whose id is not present are left unmatched.
    ///
    /// # Returns
    /// The number of distinct rows matched.
    pub fn stage_updates(&mut self, updates: &[Referral]) -> usize {
        let positions: HashMap<ReferralId, usize> = self
            .rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.id, pos))
            .collect();

        let mut matched = HashSet::new();
        for update in updates {
            let Some(&pos) = positions.get(&update.id) else {
                continue;
            };
            self.rows[pos].fields = update.fields.clone();
            self.changes.push(Change::Update(update.id));
            matched.insert(update.id);
        }
        matched.len()
    }

    /// Stages new rows, assigning ids from the sequence in input order.
    ///
    /// # Returns
    /// The inserted rows with their ids.
    pub fn stage_inserts(&mut self, inserts: &[ReferralFields]) -> Vec<Referral> {
        let mut inserted = Vec::with_capacity(inserts.len());
        for fields in inserts {
            let row = Referral::new(self.next_id, fields.clone());
            self.next_id += 1;
            self.rows.push(row.clone());
            self.changes.push(Change::Insert(row.id));
            inserted.push(row);
        }
        inserted
    }

    /// Stages removal of rows by id.
    ///
    /// # Returns
    /// The number of rows removed.
    pub fn stage_deletes(&mut self, ids: &[ReferralId]) -> usize {
        let targets: HashSet<ReferralId> = ids.iter().copied().collect();
        let changes = &mut self.changes;
        let before = self.rows.len();

        self.rows.retain(|row| {
            if targets.contains(&row.id) {
                changes.push(Change::Delete(row.id));
                false
            } else {
                true
            }
        });

        before - self.rows.len()
    }

    /// Returns the number of staged changes.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Counts staged changes by kind as `(updated, inserted, deleted)`.
    pub fn summary(&self) -> (usize, usize, usize) {
        self.changes
            .iter()
            .fold((0, 0, 0), |(u, i, d), change| match change {
                Change::Update(_) => (u + 1, i, d),
                Change::Insert(_) => (u, i + 1, d),
                Change::Delete(_) => (u, i, d + 1),
            })
    }

    /// Returns whether any change has been staged.
    pub fn has_staged_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}
