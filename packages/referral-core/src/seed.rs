//! Sample referrals written to a freshly created table.

use crate::referral::ReferralFields;

fn sample(
    referral_id: &str,
    patient_name: &str,
    patient_age: u32,
    patient_mobile: &str,
    tpa_partner: &str,
    mode_of_payment: &str,
) -> ReferralFields {
    ReferralFields {
        referral_id: Some(referral_id.to_string()),
        patient_name: Some(patient_name.to_string()),
        patient_age: Some(patient_age),
        patient_mobile: Some(patient_mobile.to_string()),
        tpa_partner: Some(tpa_partner.to_string()),
        mode_of_payment: Some(mode_of_payment.to_string()),
    }
}

/// Returns the five sample referrals, in insertion order.
pub fn sample_referrals() -> Vec<ReferralFields> {
    vec![
        sample("R001", "John Doe", 45, "9876543210", "TPA1", "TPA"),
        sample("R002", "Jane Smith", 34, "8765432109", "TPA2", "Cash"),
        sample("R003", "Alice Brown", 29, "7654321098", "TPA3", "TPA"),
        sample("R004", "Bob Johnson", 52, "6543210987", "TPA1", "Cash"),
        sample("R005", "Carol White", 41, "5432109876", "TPA2", "TPA"),
    ]
}
