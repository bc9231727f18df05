use crate::referral::ReferralId;

/// A row touched by a staged batch, recorded by id.
///
/// Rollback discards the whole staging table, so no payloads are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A row was appended with this id
    Insert(ReferralId),
    /// The row's payload was replaced
    Update(ReferralId),
    /// The row was removed
    Delete(ReferralId),
}

impl Change {
    /// Returns the id of the row this change touches.
    pub fn id(&self) -> ReferralId {
        match *self {
            Change::Insert(id) | Change::Update(id) | Change::Delete(id) => id,
        }
    }
}
