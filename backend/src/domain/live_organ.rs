//! Read-model projection of donations open for matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::donation::{DonationStatus, OrganDonation};
use super::organ::OrganType;

/// A donation currently available for matching, reduced to the fields a
/// coordinator needs to shortlist organs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOrganView {
    pub donation_id: Uuid,
    pub organ: OrganType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
}

impl LiveOrganView {
    /// Project a donation into the live view, returning `None` unless the
    /// donation is currently `available`.
    pub fn from_donation(donation: &OrganDonation) -> Option<Self> {
        if donation.status() != DonationStatus::Available {
            return None;
        }
        Some(Self {
            donation_id: donation.id(),
            organ: donation.organ(),
            latitude: donation.latitude(),
            longitude: donation.longitude(),
            viable_until: donation.viable_until(),
        })
    }
}
