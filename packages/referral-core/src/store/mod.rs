//! Storage adapter contract and the shared snapshot type.

mod memory;

use std::sync::Arc;

use crate::error::StoreError;
use crate::referral::{Referral, ReferralFields, ReferralId};

pub use memory::MemoryStore;

/// Immutable, ordered view of all rows as last loaded from a store.
///
/// Cloning is cheap; commits made after the load do not affect it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    rows: Arc<Vec<Referral>>,
}

impl Snapshot {
    /// Creates a snapshot owning the given rows.
    pub fn new(rows: Vec<Referral>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// Wraps an already shared row set.
    pub fn from_arc(rows: Arc<Vec<Referral>>) -> Self {
        Self { rows }
    }

    /// Returns an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the row displayed at `index`.
    pub fn get(&self, index: usize) -> Option<&Referral> {
        self.rows.get(index)
    }

    /// Finds a row by identity.
    pub fn find(&self, id: ReferralId) -> Option<&Referral> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn rows(&self) -> &[Referral] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Referral> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Referral;
    type IntoIter = std::slice::Iter<'a, Referral>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Row-level storage capability set consumed by the reconciler.
///
/// Batch calls are only valid between `begin_transaction` and
/// `commit`/`rollback`; their effects stay invisible to `load_all` until
/// commit. A failed `commit` leaves the transaction open so the caller can
/// roll it back.
pub trait ReferralStore {
    /// Reads the committed table in display order.
    fn load_all(&self) -> Result<Snapshot, StoreError>;

    /// Opens a transaction.
    fn begin_transaction(&mut self) -> Result<(), StoreError>;

    /// Replaces the payload of each row matched by id.
    ///
    /// Returns the number of distinct rows matched.
    fn batch_update(&mut self, rows: &[Referral]) -> Result<usize, StoreError>;

    /// Inserts rows, assigning fresh ids in input order.
    fn batch_insert(&mut self, rows: &[ReferralFields]) -> Result<Vec<Referral>, StoreError>;

    /// Removes rows by id. Returns the number of rows removed.
    fn batch_delete(&mut self, ids: &[ReferralId]) -> Result<usize, StoreError>;

    /// Makes the open transaction's effects visible.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Discards the open transaction.
    fn rollback(&mut self) -> Result<(), StoreError>;
}
