//! Tracker configuration.

use std::path::PathBuf;

/// Referral tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Directory holding the table file
    pub data_dir: PathBuf,
    /// Table file name inside `data_dir`
    pub table_file: String,
    /// Insert the sample referrals when the table file is created
    pub seed_on_create: bool,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
}

impl TrackerConfig {
    /// Returns the full path of the table file.
    pub fn table_path(&self) -> PathBuf {
        self.data_dir.join(&self.table_file)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            table_file: "referrals.json".to_string(),
            seed_on_create: true,
            persistence_max_retries: 3,
            persistence_retry_delay_ms: 100,
        }
    }
}
