//! I/O helpers for the table file.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::StoreError;

/// Maps an I/O error onto the store error taxonomy, prefixing `context`.
///
/// Only errors that may clear on their own become `TransientIoError`, which
/// is the sole kind [`retry_io_operation`] retries.
pub fn classify_io_error(error: std::io::Error, context: &str) -> StoreError {
    let message = format!("{}: {}", context, error);
    match error.kind() {
        ErrorKind::StorageFull => StoreError::DiskFull(message),
        kind if is_transient(kind) => StoreError::TransientIoError(message),
        _ => StoreError::IoError(message),
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

/// Runs `operation`, retrying only transient I/O failures.
///
/// # Arguments
/// * `operation` - Fallible I/O step
/// * `max_retries` - Retries after the first attempt
/// * `retry_delay_ms` - Sleep between attempts
/// * `context` - Label used in retry warnings
pub fn retry_io_operation<F, T>(
    mut operation: F,
    max_retries: u32,
    retry_delay_ms: u64,
    context: &str,
) -> Result<T, StoreError>
where
    F: FnMut() -> Result<T, StoreError>,
{
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(StoreError::TransientIoError(msg)) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Transient I/O error in {} (attempt {}/{}): {}",
                    context,
                    attempt,
                    max_retries,
                    msg
                );
                if retry_delay_ms > 0 {
                    std::thread::sleep(std::time::Duration::from_millis(retry_delay_ms));
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// Replaces `path` with `contents` via a synced temp file and rename.
///
/// Either the old or the new contents are visible at `path`, never a mix.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| classify_io_error(e, "Failed to create data directory"))?;
    }

    let mut file = File::create(&temp_path)
        .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
    file.write_all(contents)
        .map_err(|e| classify_io_error(e, "Failed to write table file"))?;
    file.sync_all()
        .map_err(|e| classify_io_error(e, "Failed to sync table file"))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(classify_io_error(e, "Failed to rename table file"));
    }
    Ok(())
}
