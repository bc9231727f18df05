//! Shared fixtures for integration tests.

use referral_core::error::StoreError;
use referral_core::referral::{Referral, ReferralFields, ReferralId};
use referral_core::seed::sample_referrals;
use referral_core::store::{MemoryStore, ReferralStore, Snapshot};

/// Step at which a [`FailingStore`] reports an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    Update,
    Insert,
    Delete,
    Commit,
}

/// Memory store that fails at a chosen step.
#[derive(Debug)]
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_at: Option<FailPoint>,
    pub load_fails: bool,
    /// Reads start failing once a commit succeeds
    pub unreadable_after_commit: bool,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_at: FailPoint) -> Self {
        Self {
            inner,
            fail_at: Some(fail_at),
            load_fails: false,
            unreadable_after_commit: false,
        }
    }

    /// A store whose reads fail.
    pub fn unreadable() -> Self {
        Self {
            inner: sample_store(),
            fail_at: None,
            load_fails: true,
            unreadable_after_commit: false,
        }
    }

    /// A readable store that becomes unreadable after its first commit.
    pub fn unreadable_after_commit() -> Self {
        Self {
            inner: sample_store(),
            fail_at: None,
            load_fails: false,
            unreadable_after_commit: true,
        }
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.fail_at == Some(point) {
            return Err(StoreError::IoError(format!("simulated {:?} failure", point)));
        }
        Ok(())
    }
}

impl ReferralStore for FailingStore {
    fn load_all(&self) -> Result<Snapshot, StoreError> {
        if self.load_fails {
            return Err(StoreError::IoError("simulated read failure".to_string()));
        }
        self.inner.load_all()
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        self.check(FailPoint::Begin)?;
        self.inner.begin_transaction()
    }

    fn batch_update(&mut self, rows: &[Referral]) -> Result<usize, StoreError> {
        let affected = self.inner.batch_update(rows)?;
        self.check(FailPoint::Update)?;
        Ok(affected)
    }

    fn batch_insert(&mut self, rows: &[ReferralFields]) -> Result<Vec<Referral>, StoreError> {
        let inserted = self.inner.batch_insert(rows)?;
        self.check(FailPoint::Insert)?;
        Ok(inserted)
    }

    fn batch_delete(&mut self, ids: &[ReferralId]) -> Result<usize, StoreError> {
        let removed = self.inner.batch_delete(ids)?;
        self.check(FailPoint::Delete)?;
        Ok(removed)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.check(FailPoint::Commit)?;
        self.inner.commit()?;
        if self.unreadable_after_commit {
            self.load_fails = true;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

/// Memory store holding the five sample referrals with ids 1..=5.
pub fn sample_store() -> MemoryStore {
    MemoryStore::with_rows(sample_referrals())
}

/// Ids of a snapshot, in display order.
pub fn ids(snapshot: &Snapshot) -> Vec<ReferralId> {
    snapshot.iter().map(|row| row.id).collect()
}
