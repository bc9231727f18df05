use crate::error::StoreError;
use crate::store::ReferralStore;

/// RAII guard for a store transaction with auto-rollback on drop.
///
/// If the transaction is not explicitly committed, it is rolled back when
/// the guard is dropped, including when `commit` itself fails.
#[derive(Debug)]
pub struct TransactionGuard<'s, S: ReferralStore + ?Sized> {
    /// Store the transaction is open on
    store: &'s mut S,
    /// Whether commit or rollback already ran
    finished: bool,
}

impl<'s, S: ReferralStore + ?Sized> TransactionGuard<'s, S> {
    /// Opens a transaction on `store`.
    pub fn begin(store: &'s mut S) -> Result<Self, StoreError> {
        store.begin_transaction()?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    /// Gets a mutable reference to the store for batch calls.
    pub fn store_mut(&mut self) -> &mut S {
        &mut *self.store
    }

    /// Commits the transaction.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.store.commit()?;
        self.finished = true;
        Ok(())
    }

    /// Rolls the transaction back.
    pub fn rollback(mut self) -> Result<(), StoreError> {
        self.finished = true;
        self.store.rollback()
    }
}

impl<S: ReferralStore + ?Sized> Drop for TransactionGuard<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.store.rollback() {
                tracing::warn!("Rollback after failed transaction also failed: {}", e);
            }
        }
    }
}
