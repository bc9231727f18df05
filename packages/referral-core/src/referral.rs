//! Referral row types.
//!
//! A referral is identified solely by its store-assigned `id`; every other
//! column is mutable payload carried in [`ReferralFields`].

use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned row identity.
pub type ReferralId = u64;

/// Mutable payload of a referral row.
///
/// Every column is optional so that partially filled grid rows can be
/// inserted; absent columns deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralFields {
    /// External display code
    pub referral_id: Option<String>,
    pub patient_name: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_mobile: Option<String>,
    /// Third-party administrator handling the claim
    pub tpa_partner: Option<String>,
    pub mode_of_payment: Option<String>,
}

/// One persisted referral row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    #[serde(flatten)]
    pub fields: ReferralFields,
}

impl Referral {
    /// Creates a row from an id and its payload.
    pub fn new(id: ReferralId, fields: ReferralFields) -> Self {
        Self { id, fields }
    }
}

/// Partial edit of a single row.
///
/// The outer `Option` records whether the column was touched; the inner one
/// is the new value, so `Some(None)` clears a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub referral_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<Option<u32>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_mobile: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tpa_partner: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub mode_of_payment: Option<Option<String>>,
}

/// Maps a present JSON value (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ReferralPatch {
    /// Returns `true` if no column is touched.
    pub fn is_empty(&self) -> bool {
        self.referral_id.is_none()
            && self.patient_name.is_none()
            && self.patient_age.is_none()
            && self.patient_mobile.is_none()
            && self.tpa_partner.is_none()
            && self.mode_of_payment.is_none()
    }

    /// Overwrites the touched columns of `fields`, leaving the rest alone.
    pub fn apply_to(&self, fields: &mut ReferralFields) {
        if let Some(value) = &self.referral_id {
            fields.referral_id = value.clone();
        }
        if let Some(value) = &self.patient_name {
            fields.patient_name = value.clone();
        }
        if let Some(value) = self.patient_age {
            fields.patient_age = value;
        }
        if let Some(value) = &self.patient_mobile {
            fields.patient_mobile = value.clone();
        }
        if let Some(value) = &self.tpa_partner {
            fields.tpa_partner = value.clone();
        }
        if let Some(value) = &self.mode_of_payment {
            fields.mode_of_payment = value.clone();
        }
    }

    /// Folds a later edit of the same row into this one.
    pub fn merge(&mut self, later: ReferralPatch) {
        if later.referral_id.is_some() {
            self.referral_id = later.referral_id;
        }
        if later.patient_name.is_some() {
            self.patient_name = later.patient_name;
        }
        if later.patient_age.is_some() {
            self.patient_age = later.patient_age;
        }
        if later.patient_mobile.is_some() {
            self.patient_mobile = later.patient_mobile;
        }
        if later.tpa_partner.is_some() {
            self.tpa_partner = later.tpa_partner;
        }
        if later.mode_of_payment.is_some() {
            self.mode_of_payment = later.mode_of_payment;
        }
    }
}
