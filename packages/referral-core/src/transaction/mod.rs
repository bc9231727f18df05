//! Staged changes, transaction scoping, and rollback on drop.

mod change;
mod staging_table;
mod transaction_guard;

pub use change::Change;
pub use staging_table::StagingTable;
pub use transaction_guard::TransactionGuard;
