//! Reconciliation properties against the sample table.

use referral_core::changeset::ChangeSet;
use referral_core::error::{ReconcileError, StoreError};
use referral_core::extract::{extract, RowOp};
use referral_core::reconcile::commit_changes;
use referral_core::referral::{ReferralFields, ReferralPatch};
use referral_core::store::ReferralStore;

use ntest::timeout;

use super::helpers::{ids, sample_store, FailPoint, FailingStore};

fn age(value: u32) -> ReferralPatch {
    ReferralPatch {
        patient_age: Some(Some(value)),
        ..Default::default()
    }
}

fn scenario_changes() -> ChangeSet {
    serde_json::from_str(
        r#"{
            "edited_rows": {"0": {"patient_age": 99}},
            "added_rows": [{"referral_id": "R999", "patient_name": "X"}],
            "deleted_rows": [4]
        }"#,
    )
    .unwrap()
}

/// Snapshot of 5 rows; edit row 0, add one row, delete row 4.
#[timeout(1000)]
#[test]
fn test_commit_scenario() {
    let mut store = sample_store();
    let snapshot = store.load_all().unwrap();
    let changes = scenario_changes();

    let ops = extract(&snapshot, &changes).unwrap();
    let mut updated = snapshot.get(0).unwrap().clone();
    updated.fields.patient_age = Some(99);
    assert_eq!(
        ops,
        vec![
            RowOp::Update(updated.clone()),
            RowOp::Insert(ReferralFields {
                referral_id: Some("R999".to_string()),
                patient_name: Some("X".to_string()),
                ..Default::default()
            }),
            RowOp::Delete(5),
        ]
    );

    let report = commit_changes(&mut store, &snapshot, &changes).unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.inserted.len(), 1);

    let after = store.load_all().unwrap();
    assert_eq!(after.len(), 5);
    assert_eq!(after.find(1), Some(&updated));
    for id in 2..=4 {
        assert_eq!(after.find(id), snapshot.find(id));
    }
    assert!(after.find(5).is_none());

    let new_row = &report.inserted[0];
    assert!(snapshot.find(new_row.id).is_none());
    assert_eq!(after.find(new_row.id), Some(new_row));
    assert_eq!(new_row.fields.referral_id.as_deref(), Some("R999"));
    assert_eq!(new_row.fields.patient_name.as_deref(), Some("X"));
    assert_eq!(new_row.fields.patient_age, None);
    assert_eq!(new_row.fields.tpa_partner, None);
}

#[timeout(1000)]
#[test]
fn test_ids_stable_across_commits() {
    let mut store = sample_store();

    for round in 0..4u32 {
        let snapshot = store.load_all().unwrap();
        let mut changes = ChangeSet::new();
        changes.edit_row(0, age(round));
        changes.add_row(ReferralFields::default());
        changes.delete_row(1);

        commit_changes(&mut store, &snapshot, &changes).unwrap();

        let after = store.load_all().unwrap();
        let deleted = snapshot.get(1).unwrap().id;
        for row in snapshot.iter().filter(|row| row.id != deleted) {
            let survivor = after.find(row.id).expect("surviving row keeps its id");
            if row.id != snapshot.get(0).unwrap().id {
                assert_eq!(survivor, row);
            }
        }
        assert!(after.find(deleted).is_none());
    }
}

#[timeout(1000)]
#[test]
fn test_update_merge_keeps_other_columns() {
    let store = sample_store();
    let snapshot = store.load_all().unwrap();
    let mut changes = ChangeSet::new();
    changes.edit_row(
        2,
        ReferralPatch {
            tpa_partner: Some(Some("TPA9".to_string())),
            ..Default::default()
        },
    );

    let ops = extract(&snapshot, &changes).unwrap();

    let original = snapshot.get(2).unwrap();
    match &ops[..] {
        [RowOp::Update(row)] => {
            assert_eq!(row.id, original.id);
            assert_eq!(row.fields.tpa_partner.as_deref(), Some("TPA9"));
            let mut rest = row.fields.clone();
            rest.tpa_partner = original.fields.tpa_partner.clone();
            assert_eq!(rest, original.fields);
        }
        other => panic!("Expected a single update, got {:?}", other),
    }
}

#[timeout(1000)]
#[test]
fn test_delete_uses_snapshot_identity_despite_edits() {
    let store = sample_store();
    let snapshot = store.load_all().unwrap();
    let mut changes = ChangeSet::new();
    changes.edit_row(3, age(1));
    changes.add_row(ReferralFields::default());
    changes.delete_row(3);
    changes.delete_row(0);

    let ops = extract(&snapshot, &changes).unwrap();
    let deletes: Vec<_> = ops
        .iter()
        .filter_map(|op| match op {
            RowOp::Delete(id) => Some(*id),
            _ => None,
        })
        .collect();

    assert_eq!(
        deletes,
        vec![snapshot.get(3).unwrap().id, snapshot.get(0).unwrap().id]
    );
}

#[timeout(1000)]
#[test]
fn test_failure_at_any_batch_leaves_store_unchanged() {
    for fail_at in [
        FailPoint::Begin,
        FailPoint::Update,
        FailPoint::Insert,
        FailPoint::Delete,
        FailPoint::Commit,
    ] {
        let mut store = FailingStore::new(sample_store(), fail_at);
        let before = store.load_all().unwrap();

        let result = commit_changes(&mut store, &before, &scenario_changes());

        match result {
            Err(ReconcileError::ReconciliationFailed {
                cause: StoreError::IoError(msg),
            }) => assert!(msg.contains(&format!("{:?}", fail_at))),
            other => panic!("{:?}: expected ReconciliationFailed, got {:?}", fail_at, other),
        }
        assert_eq!(store.load_all().unwrap(), before, "{:?}", fail_at);
        assert!(!store.inner.in_transaction(), "{:?}", fail_at);
        assert_eq!(store.inner.next_id(), 6, "{:?}", fail_at);
    }
}

#[timeout(1000)]
#[test]
fn test_store_usable_after_failed_commit() {
    let mut store = FailingStore::new(sample_store(), FailPoint::Delete);
    let snapshot = store.load_all().unwrap();
    assert!(commit_changes(&mut store, &snapshot, &scenario_changes()).is_err());

    store.fail_at = None;
    let report = commit_changes(&mut store, &snapshot, &scenario_changes()).unwrap();

    assert_eq!(report.inserted[0].id, 6);
    assert_eq!(ids(&store.load_all().unwrap()), vec![1, 2, 3, 4, 6]);
}

#[timeout(1000)]
#[test]
fn test_empty_changeset_is_noop() {
    let mut store = sample_store();
    let snapshot = store.load_all().unwrap();
    let changes = ChangeSet::new();

    let report = commit_changes(&mut store, &snapshot, &changes).unwrap();

    assert!(report.is_noop());
    assert!(!changes.has_uncommitted_changes());
    assert_eq!(store.load_all().unwrap(), snapshot);
    assert_eq!(store.next_id(), 6);
}

#[timeout(1000)]
#[test]
fn test_out_of_range_index_leaves_store_untouched() {
    let mut store = sample_store();
    let snapshot = store.load_all().unwrap();

    let mut edit = ChangeSet::new();
    edit.add_row(ReferralFields::default());
    edit.edit_row(5, age(1));
    assert_eq!(
        commit_changes(&mut store, &snapshot, &edit),
        Err(ReconcileError::IndexOutOfRange { index: 5, len: 5 })
    );

    let mut delete = ChangeSet::new();
    delete.edit_row(0, age(1));
    delete.delete_row(17);
    assert_eq!(
        commit_changes(&mut store, &snapshot, &delete),
        Err(ReconcileError::IndexOutOfRange { index: 17, len: 5 })
    );

    assert_eq!(store.load_all().unwrap(), snapshot);
}

#[timeout(1000)]
#[test]
fn test_stale_snapshot_index_surfaces() {
    let mut store = sample_store();
    let stale = store.load_all().unwrap();

    let mut shrink = ChangeSet::new();
    shrink.delete_row(4);
    shrink.delete_row(3);
    commit_changes(&mut store, &stale, &shrink).unwrap();

    // Index 4 exists in the stale snapshot but its row is gone from the store
    let mut late = ChangeSet::new();
    late.edit_row(4, age(1));
    let result = commit_changes(&mut store, &stale, &late);

    assert!(matches!(
        result,
        Err(ReconcileError::ReconciliationFailed {
            cause: StoreError::RowCountMismatch { operation: "update", .. }
        })
    ));

    let fresh = store.load_all().unwrap();
    assert_eq!(
        commit_changes(&mut store, &fresh, &late),
        Err(ReconcileError::IndexOutOfRange { index: 4, len: 3 })
    );
}
