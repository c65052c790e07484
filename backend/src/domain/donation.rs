//! Organ donation aggregate and its status machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organ::OrganType;
use super::participant::ParticipantId;

/// Lifecycle state of an organ donation.
///
/// Statuses only move forward along
/// `pending → verified → available → allocated → completed`; `completed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Verified,
    Available,
    Allocated,
    Completed,
}

impl DonationStatus {
    /// Canonical lower-case identifier used in storage and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Available => "available",
            Self::Allocated => "allocated",
            Self::Completed => "completed",
        }
    }

    /// Whether no further transition is possible from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the status machine permits moving from `self` to `next`.
    pub fn permits(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified)
                | (Self::Verified, Self::Available)
                | (Self::Available, Self::Allocated)
                | (Self::Allocated, Self::Completed)
        )
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`DonationStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDonationStatusError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseDonationStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid donation status: {}", self.input)
    }
}

impl std::error::Error for ParseDonationStatusError {}

impl FromStr for DonationStatus {
    type Err = ParseDonationStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "available" => Ok(Self::Available),
            "allocated" => Ok(Self::Allocated),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseDonationStatusError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Error raised when a transition violates the donation status machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationTransitionError {
    /// Status before the attempted transition.
    pub from: DonationStatus,
    /// Status the transition attempted to reach.
    pub to: DonationStatus,
}

impl fmt::Display for DonationTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "donation status may not move from {} to {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for DonationTransitionError {}

/// Validation errors raised by [`OrganDonation::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationValidationError {
    MissingClearance { status: DonationStatus },
    MissingMatchedRequest { status: DonationStatus },
    UnexpectedMatchedRequest { status: DonationStatus },
    IncompleteLocation,
}

impl fmt::Display for DonationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClearance { status } => {
                write!(f, "a {status} donation must carry medical clearance")
            }
            Self::MissingMatchedRequest { status } => {
                write!(f, "an {status} donation must reference a matched request")
            }
            Self::UnexpectedMatchedRequest { status } => {
                write!(f, "a {status} donation must not reference a matched request")
            }
            Self::IncompleteLocation => {
                write!(f, "latitude and longitude must be provided together")
            }
        }
    }
}

impl std::error::Error for DonationValidationError {}

/// Unvalidated parts for building an [`OrganDonation`].
#[derive(Debug, Clone)]
pub struct OrganDonationDraft {
    pub id: Uuid,
    pub donor_id: ParticipantId,
    pub organ: OrganType,
    pub status: DonationStatus,
    pub medical_clearance: bool,
    pub clearance_notes: Option<String>,
    pub matched_request_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A donor's recorded offer of an organ type.
///
/// ## Invariants
/// - Any status past `pending` implies `medical_clearance`.
/// - `matched_request_id` is present exactly when the status is `allocated`
///   or `completed`.
/// - Coordinates are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganDonation {
    id: Uuid,
    donor_id: ParticipantId,
    organ: OrganType,
    status: DonationStatus,
    medical_clearance: bool,
    clearance_notes: Option<String>,
    matched_request_id: Option<Uuid>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    viable_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganDonation {
    /// Validate a draft into an [`OrganDonation`].
    pub fn new(draft: OrganDonationDraft) -> Result<Self, DonationValidationError> {
        if draft.status != DonationStatus::Pending && !draft.medical_clearance {
            return Err(DonationValidationError::MissingClearance {
                status: draft.status,
            });
        }
        let requires_match = matches!(
            draft.status,
            DonationStatus::Allocated | DonationStatus::Completed
        );
        match (requires_match, draft.matched_request_id) {
            (true, None) => {
                return Err(DonationValidationError::MissingMatchedRequest {
                    status: draft.status,
                });
            }
            (false, Some(_)) => {
                return Err(DonationValidationError::UnexpectedMatchedRequest {
                    status: draft.status,
                });
            }
            _ => {}
        }
        if draft.latitude.is_some() != draft.longitude.is_some() {
            return Err(DonationValidationError::IncompleteLocation);
        }

        Ok(Self {
            id: draft.id,
            donor_id: draft.donor_id,
            organ: draft.organ,
            status: draft.status,
            medical_clearance: draft.medical_clearance,
            clearance_notes: draft.clearance_notes,
            matched_request_id: draft.matched_request_id,
            latitude: draft.latitude,
            longitude: draft.longitude,
            viable_until: draft.viable_until,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Record a fresh, unverified donation offer.
    pub fn offer(
        donor_id: ParticipantId,
        organ: OrganType,
        latitude: Option<f64>,
        longitude: Option<f64>,
        viable_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, DonationValidationError> {
        Self::new(OrganDonationDraft {
            id: Uuid::new_v4(),
            donor_id,
            organ,
            status: DonationStatus::Pending,
            medical_clearance: false,
            clearance_notes: None,
            matched_request_id: None,
            latitude,
            longitude,
            viable_until,
            created_at: now,
            updated_at: now,
        })
    }

    /// Donation identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier of the offering donor.
    pub const fn donor_id(&self) -> ParticipantId {
        self.donor_id
    }

    /// Offered organ type.
    pub const fn organ(&self) -> OrganType {
        self.organ
    }

    /// Current lifecycle status.
    pub const fn status(&self) -> DonationStatus {
        self.status
    }

    /// Doctor-confirmed eligibility flag.
    pub const fn medical_clearance(&self) -> bool {
        self.medical_clearance
    }

    /// Notes recorded alongside the clearance decision.
    pub fn clearance_notes(&self) -> Option<&str> {
        self.clearance_notes.as_deref()
    }

    /// Identifier of the matched request, once allocated.
    pub const fn matched_request_id(&self) -> Option<Uuid> {
        self.matched_request_id
    }

    /// Latitude of the retrieval site, if reported.
    pub const fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    /// Longitude of the retrieval site, if reported.
    pub const fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    /// Deadline after which the organ is no longer viable, if reported.
    pub const fn viable_until(&self) -> Option<DateTime<Utc>> {
        self.viable_until
    }

    /// Creation timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation timestamp.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn transition(
        &mut self,
        to: DonationStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DonationTransitionError> {
        if !self.status.permits(to) {
            return Err(DonationTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Grant medical clearance and move to `verified`.
    pub fn verify(
        &mut self,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DonationTransitionError> {
        self.transition(DonationStatus::Verified, now)?;
        self.medical_clearance = true;
        if notes.is_some() {
            self.clearance_notes = notes;
        }
        Ok(())
    }

    /// Publish a verified donation as available for matching.
    pub fn release(&mut self, now: DateTime<Utc>) -> Result<(), DonationTransitionError> {
        self.transition(DonationStatus::Available, now)
    }

    /// Record the matched request and move to `allocated`.
    pub fn allocate(
        &mut self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DonationTransitionError> {
        self.transition(DonationStatus::Allocated, now)?;
        self.matched_request_id = Some(request_id);
        Ok(())
    }

    /// Close out an allocated donation as completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DonationTransitionError> {
        self.transition(DonationStatus::Completed, now)
    }
}
