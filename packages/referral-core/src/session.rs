//! Edit session pairing a pinned snapshot with its pending change-set.
//!
//! This is the caller side of a commit cycle: the grid is rendered from
//! [`EditSession::snapshot`], user edits accumulate in the pending
//! [`ChangeSet`], and [`EditSession::commit`] applies them against the same
//! snapshot. Pending edits are only cleared by a successful commit or an
//! explicit discard.

use crate::changeset::ChangeSet;
use crate::error::ReconcileError;
use crate::reconcile::{commit_changes, ReconcileReport};
use crate::referral::{ReferralFields, ReferralPatch};
use crate::store::{ReferralStore, Snapshot};

/// One user's editing session over a referral store.
#[derive(Debug)]
pub struct EditSession<S: ReferralStore> {
    store: S,
    snapshot: Snapshot,
    pending: ChangeSet,
    warning: Option<ReconcileError>,
}

impl<S: ReferralStore> EditSession<S> {
    /// Opens a session and loads the first snapshot.
    ///
    /// If the store cannot be read the session starts from an empty
    /// snapshot and [`EditSession::warning`] reports `StoreUnavailable`.
    pub fn open(store: S) -> Self {
        let mut session = Self {
            store,
            snapshot: Snapshot::empty(),
            pending: ChangeSet::new(),
            warning: None,
        };
        // Failure is recorded in `warning`
        let _ = session.load_snapshot();
        session
    }

    /// The snapshot the grid should render and edits refer to.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Edits recorded since the last successful commit.
    pub fn pending(&self) -> &ChangeSet {
        &self.pending
    }

    /// Non-fatal problem from the most recent load, if any.
    pub fn warning(&self) -> Option<&ReconcileError> {
        self.warning.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether the commit action should be enabled.
    pub fn has_uncommitted_changes(&self) -> bool {
        self.pending.has_uncommitted_changes()
    }

    /// Records an edit of the row displayed at `index`.
    pub fn edit_row(&mut self, index: usize, patch: ReferralPatch) -> Result<(), ReconcileError> {
        self.check_index(index)?;
        self.pending.edit_row(index, patch);
        Ok(())
    }

    /// Records a new row.
    pub fn add_row(&mut self, fields: ReferralFields) {
        self.pending.add_row(fields);
    }

    /// Marks the row displayed at `index` for removal.
    pub fn delete_row(&mut self, index: usize) -> Result<(), ReconcileError> {
        self.check_index(index)?;
        self.pending.delete_row(index);
        Ok(())
    }

    /// Replaces the pending edits wholesale, e.g. with a grid notification.
    ///
    /// Indices are not checked here; `commit` surfaces bad ones.
    pub fn replace_pending(&mut self, changes: ChangeSet) {
        self.pending = changes;
    }

    /// Applies pending edits against the pinned snapshot.
    ///
    /// On success the pending edits are cleared and the snapshot reloaded.
    /// On failure both are left untouched so no edit is lost. If the commit
    /// succeeds but the reload fails, the edits are still cleared (they are
    /// committed), the snapshot falls back to empty and `StoreUnavailable`
    /// is returned.
    pub fn commit(&mut self) -> Result<ReconcileReport, ReconcileError> {
        if !self.pending.has_uncommitted_changes() {
            return Ok(ReconcileReport::default());
        }

        let report = match commit_changes(&mut self.store, &self.snapshot, &self.pending) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(pending = self.pending.len(), "Commit failed, keeping edits: {}", e);
                return Err(e);
            }
        };

        self.pending.clear();
        self.load_snapshot()?;
        Ok(report)
    }

    /// Abandons pending edits without touching the store.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Abandons pending edits and reloads the snapshot.
    pub fn reload(&mut self) -> Result<(), ReconcileError> {
        self.pending.clear();
        self.load_snapshot()
    }

    fn check_index(&self, index: usize) -> Result<(), ReconcileError> {
        if index >= self.snapshot.len() {
            return Err(ReconcileError::IndexOutOfRange {
                index,
                len: self.snapshot.len(),
            });
        }
        Ok(())
    }

    fn load_snapshot(&mut self) -> Result<(), ReconcileError> {
        match self.store.load_all() {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.warning = None;
                Ok(())
            }
            Err(cause) => {
                tracing::warn!("Referral store unavailable, showing empty table: {}", cause);
                let error = ReconcileError::StoreUnavailable { cause };
                self.snapshot = Snapshot::empty();
                self.warning = Some(error.clone());
                Err(error)
            }
        }
    }
}
