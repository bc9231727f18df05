//! File-backed referral store.
//!
//! The table lives in a single JSON file holding the rows, the id sequence
//! and a CRC32 of the rows. Commits rewrite the file through a temp file and
//! rename before the in-memory state is swapped, so a failed write leaves
//! both disk and memory at the pre-commit state.

mod io_utils;

pub use io_utils::{classify_io_error, retry_io_operation, write_atomically};

use std::fs;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::error::{ReconcileError, StoreError};
use crate::referral::{Referral, ReferralFields, ReferralId};
use crate::seed::sample_referrals;
use crate::store::{MemoryStore, ReferralStore, Snapshot};

/// Current table file format version.
pub const TABLE_FILE_VERSION: u32 = 1;

/// On-disk table file format.
#[derive(Debug, Serialize, Deserialize)]
pub struct TableFile {
    /// Format version
    pub version: u32,
    /// Next id to assign
    pub next_id: ReferralId,
    /// CRC32 of the serialized rows
    pub checksum: u32,
    /// Rows in display order
    pub rows: Vec<Referral>,
}

impl TableFile {
    /// Builds a table file for `rows`, computing its checksum.
    pub fn new(rows: Vec<Referral>, next_id: ReferralId) -> Result<Self, StoreError> {
        let checksum = rows_checksum(&rows)?;
        Ok(Self {
            version: TABLE_FILE_VERSION,
            next_id,
            checksum,
            rows,
        })
    }

    /// Checks version and checksum.
    pub fn verify(&self) -> Result<(), StoreError> {
        if self.version != TABLE_FILE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: self.version,
                expected: TABLE_FILE_VERSION,
            });
        }
        let actual = rows_checksum(&self.rows)?;
        if actual != self.checksum {
            return Err(StoreError::DataCorruption(format!(
                "table checksum mismatch: expected {:08x}, got {:08x}",
                self.checksum, actual
            )));
        }
        Ok(())
    }
}

fn rows_checksum(rows: &[Referral]) -> Result<u32, StoreError> {
    let bytes =
        serde_json::to_vec(rows).map_err(|e| StoreError::SerializationError(e.to_string()))?;
    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    Ok(hasher.finalize())
}

/// Referral store persisted to a JSON table file.
#[derive(Debug)]
pub struct FileStore {
    /// Table file path
    path: PathBuf,
    /// Committed and staged state
    inner: MemoryStore,
    /// Whether `open` created the file
    created: bool,
    /// Maximum retry attempts for transient I/O errors
    max_retries: u32,
    /// Delay between retry attempts in milliseconds
    retry_delay_ms: u64,
}

impl FileStore {
    /// Opens the table file named by `config`, creating it if missing.
    ///
    /// A newly created table is seeded with the sample referrals when
    /// `seed_on_create` is set.
    ///
    /// # Returns
    /// `Result<FileStore, StoreError>`; fails on I/O errors, an unknown
    /// version, or a checksum mismatch.
    pub fn open(config: &TrackerConfig) -> Result<Self, StoreError> {
        let path = config.table_path();
        let max_retries = config.persistence_max_retries;
        let retry_delay_ms = config.persistence_retry_delay_ms;

        if path.exists() {
            let inner = retry_io_operation(
                || load_table(&path),
                max_retries,
                retry_delay_ms,
                "load_table",
            )?;
            let rows = inner.load_all()?.len();
            tracing::info!(path = %path.display(), rows, "Opened referral table");
            return Ok(Self {
                path,
                inner,
                created: false,
                max_retries,
                retry_delay_ms,
            });
        }

        let inner = if config.seed_on_create {
            MemoryStore::with_rows(sample_referrals())
        } else {
            MemoryStore::new()
        };
        let store = Self {
            path,
            inner,
            created: true,
            max_retries,
            retry_delay_ms,
        };
        let rows = store.inner.load_all()?;
        store.persist(rows.rows().to_vec(), store.inner.next_id())?;
        tracing::info!(
            path = %store.path.display(),
            rows = rows.len(),
            "Created referral table"
        );
        Ok(store)
    }

    /// Returns the table file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether `open` created the table file.
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Returns the id the next committed insert would receive.
    pub fn next_id(&self) -> ReferralId {
        self.inner.next_id()
    }

    fn persist(&self, rows: Vec<Referral>, next_id: ReferralId) -> Result<(), StoreError> {
        let file = TableFile::new(rows, next_id)?;
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        retry_io_operation(
            || write_atomically(&self.path, &json),
            self.max_retries,
            self.retry_delay_ms,
            "save_table",
        )
    }
}

/// Opens the table named by `config` for display only.
///
/// An unreadable or corrupt table yields an empty snapshot together with a
/// `StoreUnavailable` warning instead of an error.
pub fn open_snapshot(config: &TrackerConfig) -> (Snapshot, Option<ReconcileError>) {
    match FileStore::open(config).and_then(|store| store.load_all()) {
        Ok(snapshot) => (snapshot, None),
        Err(cause) => {
            tracing::warn!(
                path = %config.table_path().display(),
                "Referral table unavailable, showing empty table: {}",
                cause
            );
            (Snapshot::empty(), Some(ReconcileError::StoreUnavailable { cause }))
        }
    }
}

fn load_table(path: &Path) -> Result<MemoryStore, StoreError> {
    let bytes = fs::read(path).map_err(|e| classify_io_error(e, "Failed to read table file"))?;
    let file: TableFile = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::DataCorruption(format!("invalid table file: {}", e)))?;
    file.verify()?;
    MemoryStore::from_parts(file.rows, file.next_id)
}

impl ReferralStore for FileStore {
    fn load_all(&self) -> Result<Snapshot, StoreError> {
        self.inner.load_all()
    }

    fn begin_transaction(&mut self) -> Result<(), StoreError> {
        self.inner.begin_transaction()
    }

    fn batch_update(&mut self, rows: &[Referral]) -> Result<usize, StoreError> {
        self.inner.batch_update(rows)
    }

    fn batch_insert(&mut self, rows: &[ReferralFields]) -> Result<Vec<Referral>, StoreError> {
        self.inner.batch_insert(rows)
    }

    fn batch_delete(&mut self, ids: &[ReferralId]) -> Result<usize, StoreError> {
        self.inner.batch_delete(ids)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let staged = self.inner.staged().ok_or(StoreError::NoActiveTransaction)?;
        if staged.has_staged_changes() {
            self.persist(staged.rows.clone(), staged.next_id)?;
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}
