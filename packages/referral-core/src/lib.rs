//! Change-set extraction and transactional reconciliation for referral tables.
//!
//! Provides the typed referral row, the grid change-set, the extractor that
//! resolves display indices against a pinned snapshot, the reconciler that
//! applies row operations atomically, and in-memory and file-backed stores.

pub mod changeset;
pub mod config;
pub mod error;
pub mod extract;
pub mod persistence;
pub mod reconcile;
pub mod referral;
pub mod report;
pub mod seed;
pub mod session;
pub mod store;
pub mod transaction;

pub use changeset::ChangeSet;
pub use error::{ReconcileError, StoreError};
pub use extract::{extract, RowOp};
pub use reconcile::{commit_changes, ReconcileReport, Reconciler};
pub use referral::{Referral, ReferralFields, ReferralId, ReferralPatch};
pub use session::EditSession;
pub use store::{MemoryStore, ReferralStore, Snapshot};
