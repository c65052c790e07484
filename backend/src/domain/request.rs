//! Organ request aggregate and its status machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organ::{OrganType, Urgency};
use super::participant::ParticipantId;

/// Lifecycle state of an organ request.
///
/// Statuses only move forward along
/// `pending → approved → matched → transplanted`; `rejected` is reachable
/// from `pending` and `approved` only. `transplanted` and `rejected` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Matched,
    Transplanted,
    Rejected,
}

impl RequestStatus {
    /// Canonical lower-case identifier used in storage and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Matched => "matched",
            Self::Transplanted => "transplanted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further transition is possible from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Transplanted | Self::Rejected)
    }

    /// Whether the status machine permits moving from `self` to `next`.
    pub fn permits(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Approved, Self::Matched)
                | (Self::Matched, Self::Transplanted)
                | (Self::Pending | Self::Approved, Self::Rejected)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`RequestStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequestStatusError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseRequestStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request status: {}", self.input)
    }
}

impl std::error::Error for ParseRequestStatusError {}

impl FromStr for RequestStatus {
    type Err = ParseRequestStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "matched" => Ok(Self::Matched),
            "transplanted" => Ok(Self::Transplanted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseRequestStatusError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Error raised when a transition violates the request status machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTransitionError {
    /// Status before the attempted transition.
    pub from: RequestStatus,
    /// Status the transition attempted to reach.
    pub to: RequestStatus,
}

impl fmt::Display for RequestTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request status may not move from {} to {}",
            self.from, self.to
        )
    }
}

impl std::error::Error for RequestTransitionError {}

/// Validation errors raised by [`OrganRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    EmptyMedicalCondition,
    MissingMatchedDonation { status: RequestStatus },
    UnexpectedMatchedDonation { status: RequestStatus },
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMedicalCondition => {
                write!(f, "medical condition must not be empty")
            }
            Self::MissingMatchedDonation { status } => {
                write!(f, "a {status} request must reference a matched donation")
            }
            Self::UnexpectedMatchedDonation { status } => {
                write!(f, "a {status} request must not reference a matched donation")
            }
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Unvalidated parts for building an [`OrganRequest`].
#[derive(Debug, Clone)]
pub struct OrganRequestDraft {
    pub id: Uuid,
    pub patient_id: ParticipantId,
    pub organ: OrganType,
    pub urgency: Urgency,
    pub medical_condition: String,
    pub status: RequestStatus,
    pub matched_donation_id: Option<Uuid>,
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A patient's recorded need for an organ type.
///
/// ## Invariants
/// - `medical_condition` is non-empty once trimmed.
/// - `matched_donation_id` is present exactly when the status is `matched`
///   or `transplanted`.
/// - Status changes go through the transition methods, which enforce the
///   forward-only machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganRequest {
    id: Uuid,
    patient_id: ParticipantId,
    organ: OrganType,
    urgency: Urgency,
    medical_condition: String,
    status: RequestStatus,
    matched_donation_id: Option<Uuid>,
    doctor_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganRequest {
    /// Validate a draft into an [`OrganRequest`].
    pub fn new(draft: OrganRequestDraft) -> Result<Self, RequestValidationError> {
        if draft.medical_condition.trim().is_empty() {
            return Err(RequestValidationError::EmptyMedicalCondition);
        }
        let requires_match = matches!(
            draft.status,
            RequestStatus::Matched | RequestStatus::Transplanted
        );
        match (requires_match, draft.matched_donation_id) {
            (true, None) => {
                return Err(RequestValidationError::MissingMatchedDonation {
                    status: draft.status,
                });
            }
            (false, Some(_)) => {
                return Err(RequestValidationError::UnexpectedMatchedDonation {
                    status: draft.status,
                });
            }
            _ => {}
        }

        Ok(Self {
            id: draft.id,
            patient_id: draft.patient_id,
            organ: draft.organ,
            urgency: draft.urgency,
            medical_condition: draft.medical_condition,
            status: draft.status,
            matched_donation_id: draft.matched_donation_id,
            doctor_notes: draft.doctor_notes,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Open a fresh, pending request for a patient.
    pub fn open(
        patient_id: ParticipantId,
        organ: OrganType,
        urgency: Urgency,
        medical_condition: String,
        now: DateTime<Utc>,
    ) -> Result<Self, RequestValidationError> {
        Self::new(OrganRequestDraft {
            id: Uuid::new_v4(),
            patient_id,
            organ,
            urgency,
            medical_condition,
            status: RequestStatus::Pending,
            matched_donation_id: None,
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Request identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier of the requesting patient.
    pub const fn patient_id(&self) -> ParticipantId {
        self.patient_id
    }

    /// Requested organ type.
    pub const fn organ(&self) -> OrganType {
        self.organ
    }

    /// Declared clinical urgency.
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Free-text description of the underlying condition.
    pub fn medical_condition(&self) -> &str {
        self.medical_condition.as_str()
    }

    /// Current lifecycle status.
    pub const fn status(&self) -> RequestStatus {
        self.status
    }

    /// Identifier of the allocated donation, once matched.
    pub const fn matched_donation_id(&self) -> Option<Uuid> {
        self.matched_donation_id
    }

    /// Notes recorded by the adjudicating doctor.
    pub fn doctor_notes(&self) -> Option<&str> {
        self.doctor_notes.as_deref()
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
        to: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<(), RequestTransitionError> {
        if !self.status.permits(to) {
            return Err(RequestTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Approve a pending request, optionally recording doctor notes.
    pub fn approve(
        &mut self,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), RequestTransitionError> {
        self.transition(RequestStatus::Approved, now)?;
        if notes.is_some() {
            self.doctor_notes = notes;
        }
        Ok(())
    }

    /// Reject a pending or approved request, optionally recording doctor
    /// notes.
    pub fn reject(
        &mut self,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), RequestTransitionError> {
        self.transition(RequestStatus::Rejected, now)?;
        if notes.is_some() {
            self.doctor_notes = notes;
        }
        Ok(())
    }

    /// Record the allocated donation and move to `matched`.
    pub fn mark_matched(
        &mut self,
        donation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), RequestTransitionError> {
        self.transition(RequestStatus::Matched, now)?;
        self.matched_donation_id = Some(donation_id);
        Ok(())
    }

    /// Close out a matched request as transplanted.
    pub fn mark_transplanted(&mut self, now: DateTime<Utc>) -> Result<(), RequestTransitionError> {
        self.transition(RequestStatus::Transplanted, now)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn pending_request() -> OrganRequest {
        OrganRequest::open(
            ParticipantId::random(),
            OrganType::Heart,
            Urgency::new(5).expect("valid urgency"),
            "dilated cardiomyopathy".to_owned(),
            Utc::now(),
        )
        .expect("valid request")
    }

    #[rstest]
    fn full_forward_path_is_permitted(mut pending_request: OrganRequest) {
        let now = Utc::now();
        let donation_id = Uuid::new_v4();

        pending_request
            .approve(Some("cleared by cardiology".to_owned()), now)
            .expect("approve");
        pending_request
            .mark_matched(donation_id, now)
            .expect("match");
        pending_request.mark_transplanted(now).expect("complete");

        assert_eq!(pending_request.status(), RequestStatus::Transplanted);
        assert_eq!(pending_request.matched_donation_id(), Some(donation_id));
        assert_eq!(
            pending_request.doctor_notes(),
            Some("cleared by cardiology")
        );
    }

    #[rstest]
    fn pending_request_cannot_skip_to_matched(mut pending_request: OrganRequest) {
        let err = pending_request
            .mark_matched(Uuid::new_v4(), Utc::now())
            .expect_err("skip rejected");
        assert_eq!(err.from, RequestStatus::Pending);
        assert_eq!(err.to, RequestStatus::Matched);
        assert_eq!(pending_request.status(), RequestStatus::Pending);
    }

    #[rstest]
    fn pending_request_cannot_skip_to_transplanted(mut pending_request: OrganRequest) {
        let err = pending_request
            .mark_transplanted(Utc::now())
            .expect_err("skip rejected");
        assert_eq!(err.to, RequestStatus::Transplanted);
    }

    #[rstest]
    #[case(RequestStatus::Pending, true)]
    #[case(RequestStatus::Approved, true)]
    #[case(RequestStatus::Matched, false)]
    fn rejection_is_only_reachable_before_matching(
        #[case] from: RequestStatus,
        #[case] permitted: bool,
    ) {
        assert_eq!(from.permits(RequestStatus::Rejected), permitted);
    }

    #[rstest]
    fn rejected_request_is_terminal(mut pending_request: OrganRequest) {
        pending_request
            .reject(None, Utc::now())
            .expect("reject pending");

        assert!(pending_request.status().is_terminal());
        assert!(
            pending_request
                .approve(None, Utc::now())
                .is_err()
        );
    }

    #[rstest]
    fn empty_medical_condition_is_rejected() {
        let err = OrganRequest::open(
            ParticipantId::random(),
            OrganType::Kidney,
            Urgency::new(2).expect("valid urgency"),
            "   ".to_owned(),
            Utc::now(),
        )
        .expect_err("empty condition rejected");
        assert_eq!(err, RequestValidationError::EmptyMedicalCondition);
    }

    #[rstest]
    fn matched_draft_requires_donation_reference() {
        let now = Utc::now();
        let err = OrganRequest::new(OrganRequestDraft {
            id: Uuid::new_v4(),
            patient_id: ParticipantId::random(),
            organ: OrganType::Liver,
            urgency: Urgency::new(3).expect("valid urgency"),
            medical_condition: "cirrhosis".to_owned(),
            status: RequestStatus::Matched,
            matched_donation_id: None,
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        })
        .expect_err("matched without donation rejected");
        assert!(matches!(
            err,
            RequestValidationError::MissingMatchedDonation { .. }
        ));
    }

    #[rstest]
    fn pending_draft_rejects_stray_donation_reference() {
        let now = Utc::now();
        let err = OrganRequest::new(OrganRequestDraft {
            id: Uuid::new_v4(),
            patient_id: ParticipantId::random(),
            organ: OrganType::Liver,
            urgency: Urgency::new(3).expect("valid urgency"),
            medical_condition: "cirrhosis".to_owned(),
            status: RequestStatus::Pending,
            matched_donation_id: Some(Uuid::new_v4()),
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        })
        .expect_err("stray donation reference rejected");
        assert!(matches!(
            err,
            RequestValidationError::UnexpectedMatchedDonation { .. }
        ));
    }
}
