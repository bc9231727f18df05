//! In-memory referral store with copy-on-write commits.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::StoreError;
use crate::referral::{Referral, ReferralFields, ReferralId};
use crate::transaction::StagingTable;

use super::{ReferralStore, Snapshot};

/// Referral table held in memory.
///
/// Committed rows sit behind an `ArcSwap`; a transaction stages a private
/// copy and commit swaps it in, so readers holding an older snapshot keep
/// seeing it unchanged.
#[derive(Debug)]
pub struct MemoryStore {
    /// Committed rows in display order
    committed: ArcSwap<Vec<Referral>>,
    /// Next id to assign; only ever grows
    next_id: ReferralId,
    /// Open transaction, if any
    staging: Option<StagingTable>,
}

impl MemoryStore {
    /// Creates an empty store whose first id will be 1.
    pub fn new() -> Self {
        Self {
            committed: ArcSwap::from_pointee(Vec::new()),
            next_id: 1,
            staging: None,
        }
    }

    /// Creates a store holding `rows`, assigned ids 1..=n in order.
    pub fn with_rows(rows: Vec<ReferralFields>) -> Self {
        let committed: Vec<Referral> = rows
            .into_iter()
            .zip(1..)
            .map(|(fields, id)| Referral::new(id, fields))
            .collect();
        let next_id = committed.len() as ReferralId + 1;
        Self {
            committed: ArcSwap::from_pointee(committed),
            next_id,
            staging: None,
        }
    }

    /// Restores a store from previously committed rows and id sequence.
    ///
    /// # Returns
    /// `Result<MemoryStore, StoreError>`; fails if ids repeat or the
    /// sequence would hand out an id already in use.
    pub fn from_parts(rows: Vec<Referral>, next_id: ReferralId) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.id) {
                return Err(StoreError::DuplicateId(row.id));
            }
            if row.id >= next_id {
                return Err(StoreError::DataCorruption(format!(
                    "row id {} is not below id sequence {}",
                    row.id, next_id
                )));
            }
        }
        Ok(Self {
            committed: ArcSwap::from_pointee(rows),
            next_id,
            staging: None,
        })
    }

    /// Returns the id the next committed insert would receive.
    pub fn next_id(&self) -> ReferralId {
        self.next_id
    }

    /// Returns whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.staging.is_some()
    }

    /// Returns the open transaction's staging table.
    pub fn staged(&self) -> Option<&StagingTable> {
        self.staging.as_ref()
    }

    fn staging_mut(&mut self) -> Result<&mut StagingTable, StoreError> {
        self.staging.as_mut().ok_or(StoreError::NoActiveTransaction)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferralStore for MemoryStore {
    fn load_all(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot::from_arc(self.committed.load_full()))
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        if self.staging.is_some() {
            return Err(StoreError::TransactionActive);
        }
        let committed = self.committed.load();
        self.staging = Some(StagingTable::new(&committed, self.next_id));
        Ok(())
    }

    fn batch_update(&mut self, rows: &[Referral]) -> Result<usize, StoreError> {
        let matched = self.staging_mut()?.stage_updates(rows);
        tracing::debug!(requested = rows.len(), matched, "Staged referral updates");
        Ok(matched)
    }

    fn batch_insert(&mut self, rows: &[ReferralFields]) -> Result<Vec<Referral>, StoreError> {
        let inserted = self.staging_mut()?.stage_inserts(rows);
        tracing::debug!(inserted = inserted.len(), "Staged referral inserts");
        Ok(inserted)
    }

    fn batch_delete(&mut self, ids: &[ReferralId]) -> Result<usize, StoreError> {
        let removed = self.staging_mut()?.stage_deletes(ids);
        tracing::debug!(requested = ids.len(), removed, "Staged referral deletes");
        Ok(removed)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let staging = self.staging.take().ok_or(StoreError::NoActiveTransaction)?;
        let (updated, inserted, deleted) = staging.summary();
        tracing::debug!(updated, inserted, deleted, "Committing staged referral changes");
        self.next_id = staging.next_id;
        self.committed.store(Arc::new(staging.rows));
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let staging = self.staging.take().ok_or(StoreError::NoActiveTransaction)?;
        tracing::debug!(changes = staging.change_count(), "Discarded staged referral changes");
        Ok(())
    }
}
