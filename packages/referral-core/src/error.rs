//! Store and reconciliation error types.

use thiserror::Error;

use crate::referral::ReferralId;

/// Storage adapter errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Batch or commit call issued outside a transaction
    #[error("No active transaction")]
    NoActiveTransaction,

    /// `begin_transaction` called while another transaction is open
    #[error("Transaction already active")]
    TransactionActive,

    /// A batch touched fewer rows than it was given
    #[error("Row count mismatch during {operation}: expected {expected}, affected {affected}")]
    RowCountMismatch {
        operation: &'static str,
        expected: usize,
        affected: usize,
    },

    /// Two rows share the same identity
    #[error("Duplicate referral id {0}")]
    DuplicateId(ReferralId),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Table file version is not understood
    #[error("Unsupported table file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Data corruption detected
    #[error("Data corruption detected: {0}")]
    DataCorruption(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error during persistence
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),
}

/// Errors surfaced to the caller of a commit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// An edit or delete referenced a row the snapshot does not have
    #[error("Row index {index} out of range for snapshot of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    /// The store rejected a batch or the commit; nothing was applied
    #[error("Reconciliation failed: {cause}")]
    ReconciliationFailed {
        #[source]
        cause: StoreError,
    },

    /// The store could not be read
    #[error("Store unavailable: {cause}")]
    StoreUnavailable {
        #[source]
        cause: StoreError,
    },
}
