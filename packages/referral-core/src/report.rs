//! Referral breakdown by payment mode and TPA partner.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::Snapshot;

/// Number of referrals sharing a payment mode and TPA partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub mode_of_payment: String,
    pub tpa_partner: String,
    pub count: usize,
}

/// Counts referrals per `(mode_of_payment, tpa_partner)`.
///
/// Rows missing either key are left out. Output is sorted by payment mode,
/// then partner.
pub fn tpa_breakdown(snapshot: &Snapshot) -> Vec<BreakdownRow> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for row in snapshot {
        if let (Some(mode), Some(tpa)) = (&row.fields.mode_of_payment, &row.fields.tpa_partner) {
            *counts.entry((mode.as_str(), tpa.as_str())).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((mode, tpa), count)| BreakdownRow {
            mode_of_payment: mode.to_string(),
            tpa_partner: tpa.to_string(),
            count,
        })
        .collect()
}
