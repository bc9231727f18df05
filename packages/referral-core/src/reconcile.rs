//! Transactional application of row operations to a store.

use std::collections::HashSet;

use crate::changeset::ChangeSet;
use crate::error::{ReconcileError, StoreError};
use crate::extract::{extract, RowOp};
use crate::referral::{Referral, ReferralFields, ReferralId};
use crate::store::{ReferralStore, Snapshot};
use crate::transaction::TransactionGuard;

/// Rows affected by a successful commit, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of rows updated
    pub updated: usize,
    /// Inserted rows with their store-assigned ids
    pub inserted: Vec<Referral>,
    /// Number of rows deleted
    pub deleted: usize,
}

impl ReconcileReport {
    /// Total rows affected across all kinds.
    pub fn total(&self) -> usize {
        self.updated + self.inserted.len() + self.deleted
    }

    /// Returns `true` if the commit touched nothing.
    pub fn is_noop(&self) -> bool {
        self.total() == 0
    }
}

/// Operations split by kind, each kind in input order.
#[derive(Debug, Default)]
struct OpGroups {
    updates: Vec<Referral>,
    inserts: Vec<ReferralFields>,
    deletes: Vec<ReferralId>,
}

impl OpGroups {
    fn from_ops(ops: Vec<RowOp>) -> Self {
        let mut groups = Self::default();
        let mut deleting = HashSet::new();
        for op in ops {
            match op {
                RowOp::Update(row) => groups.updates.push(row),
                RowOp::Insert(fields) => groups.inserts.push(fields),
                RowOp::Delete(id) => {
                    if deleting.insert(id) {
                        groups.deletes.push(id);
                    }
                }
            }
        }
        groups
    }

    fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Applies row operations to a store inside a single transaction.
///
/// The store is exclusively borrowed for the lifetime of the reconciler.
/// There is no retry: a store failure ends the attempt and is reported.
#[derive(Debug)]
pub struct Reconciler<'s, S: ReferralStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: ReferralStore + ?Sized> Reconciler<'s, S> {
    /// Creates a reconciler over `store`.
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Applies `ops` atomically.
    ///
    /// Issues one batch per non-empty kind in the order update, insert,
    /// delete. A batch that affects fewer rows than it names is a failure.
    /// On any failure the transaction is rolled back and the store keeps
    /// its pre-commit state. An empty list does not open a transaction.
    ///
    /// # Returns
    /// `Result<ReconcileReport, ReconcileError>` with per-kind counts.
    pub fn apply(&mut self, ops: Vec<RowOp>) -> Result<ReconcileReport, ReconcileError> {
        let groups = OpGroups::from_ops(ops);
        if groups.is_empty() {
            tracing::debug!("Nothing to reconcile");
            return Ok(ReconcileReport::default());
        }

        let report = apply_groups(&mut *self.store, &groups).map_err(|cause| {
            tracing::error!("Reconciliation rolled back: {}", cause);
            ReconcileError::ReconciliationFailed { cause }
        })?;

        tracing::info!(
            updated = report.updated,
            inserted = report.inserted.len(),
            deleted = report.deleted,
            "Committed referral changes"
        );
        Ok(report)
    }
}

fn apply_groups<S: ReferralStore + ?Sized>(
    store: &mut S,
    groups: &OpGroups,
) -> Result<ReconcileReport, StoreError> {
    let mut tx = TransactionGuard::begin(store)?;
    let mut report = ReconcileReport::default();

    if !groups.updates.is_empty() {
        let expected = groups
            .updates
            .iter()
            .map(|row| row.id)
            .collect::<HashSet<_>>()
            .len();
        report.updated = tx.store_mut().batch_update(&groups.updates)?;
        check_count("update", expected, report.updated)?;
    }

    if !groups.inserts.is_empty() {
        report.inserted = tx.store_mut().batch_insert(&groups.inserts)?;
        check_count("insert", groups.inserts.len(), report.inserted.len())?;
    }

    if !groups.deletes.is_empty() {
        report.deleted = tx.store_mut().batch_delete(&groups.deletes)?;
        check_count("delete", groups.deletes.len(), report.deleted)?;
    }

    tx.commit()?;
    Ok(report)
}

fn check_count(operation: &'static str, expected: usize, affected: usize) -> Result<(), StoreError> {
    if affected != expected {
        return Err(StoreError::RowCountMismatch {
            operation,
            expected,
            affected,
        });
    }
    Ok(())
}

/// Extracts `changes` against `snapshot` and applies them to `store`.
///
/// Extraction runs to completion before the store is touched, so an
/// `IndexOutOfRange` leaves the store unchanged.
pub fn commit_changes<S: ReferralStore + ?Sized>(
    store: &mut S,
    snapshot: &Snapshot,
    changes: &ChangeSet,
) -> Result<ReconcileReport, ReconcileError> {
    let ops = extract(snapshot, changes)?;
    Reconciler::new(store).apply(ops)
}
