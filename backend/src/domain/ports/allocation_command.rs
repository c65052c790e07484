//! Driving port for allocation mutations.
//!
//! Covers the full lifecycle: opening requests and donations, adjudicating
//! them, matching a request to a donation, completing the transplant, and
//! recording manual ledger notes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    Error, LedgerEntry, OrganDonation, OrganRequest, OrganType, ParticipantId, Urgency,
};

/// Command to open an organ request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestCommand {
    /// Requesting patient.
    pub actor_id: ParticipantId,
    pub organ: OrganType,
    pub urgency: Urgency,
    pub medical_condition: String,
}

/// Command to record a donation offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationCommand {
    /// Offering donor.
    pub actor_id: ParticipantId,
    pub organ: OrganType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
}

/// Command to approve or reject a pending request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestCommand {
    /// Adjudicating doctor or admin.
    pub actor_id: ParticipantId,
    pub request_id: Uuid,
    pub notes: Option<String>,
}

/// Command to grant medical clearance to a pending donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDonationCommand {
    /// Adjudicating doctor or admin.
    pub actor_id: ParticipantId,
    pub donation_id: Uuid,
    pub notes: Option<String>,
}

/// Command to publish a verified donation as available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDonationCommand {
    /// Adjudicating doctor or admin.
    pub actor_id: ParticipantId,
    pub donation_id: Uuid,
}

/// Command to match an approved request with an available donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOrgansCommand {
    /// Adjudicating doctor or admin.
    pub actor_id: ParticipantId,
    pub request_id: Uuid,
    pub donation_id: Uuid,
}

/// Command to complete the transplant for a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTransplantCommand {
    /// Adjudicating doctor or admin.
    pub actor_id: ParticipantId,
    pub request_id: Uuid,
}

/// Command to append a manual note to the audit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionCommand {
    pub actor_id: ParticipantId,
    pub request_id: Option<Uuid>,
    pub donation_id: Option<Uuid>,
    pub metadata: Value,
}

/// Both sides of a match or completion, returned together so callers see the
/// reciprocal cross-references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub request: OrganRequest,
    pub donation: OrganDonation,
}

/// Driving port for allocation write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AllocationCommand: Send + Sync {
    /// Open a pending organ request. The actor must be a patient.
    async fn create_request(&self, command: CreateRequestCommand)
    -> Result<OrganRequest, Error>;

    /// Record a pending donation offer. The actor must be a donor.
    async fn create_donation(
        &self,
        command: CreateDonationCommand,
    ) -> Result<OrganDonation, Error>;

    /// Approve a pending request.
    async fn approve_request(&self, command: ReviewRequestCommand)
    -> Result<OrganRequest, Error>;

    /// Reject a pending or approved request.
    async fn reject_request(&self, command: ReviewRequestCommand)
    -> Result<OrganRequest, Error>;

    /// Grant medical clearance to a pending donation.
    async fn verify_donation(
        &self,
        command: VerifyDonationCommand,
    ) -> Result<OrganDonation, Error>;

    /// Publish a verified donation as available for matching.
    async fn release_donation(
        &self,
        command: ReleaseDonationCommand,
    ) -> Result<OrganDonation, Error>;

    /// Match an approved request with an available donation of the same
    /// organ type, updating both atomically.
    async fn match_organs(&self, command: MatchOrgansCommand) -> Result<MatchOutcome, Error>;

    /// Complete the transplant for a matched request. Completing an already
    /// completed pair returns the current state unchanged.
    async fn complete_transplant(
        &self,
        command: CompleteTransplantCommand,
    ) -> Result<MatchOutcome, Error>;

    /// Append a manual note to the audit ledger.
    async fn record_transaction(
        &self,
        command: RecordTransactionCommand,
    ) -> Result<LedgerEntry, Error>;
}

/// Fixture command implementation for tests that do not exercise allocation
/// writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAllocationCommand;

impl FixtureAllocationCommand {
    fn unavailable() -> Error {
        Error::service_unavailable("allocation service is not configured")
    }
}

#[async_trait]
impl AllocationCommand for FixtureAllocationCommand {
    async fn create_request(
        &self,
        _command: CreateRequestCommand,
    ) -> Result<OrganRequest, Error> {
        Err(Self::unavailable())
    }

    async fn create_donation(
        &self,
        _command: CreateDonationCommand,
    ) -> Result<OrganDonation, Error> {
        Err(Self::unavailable())
    }

    async fn approve_request(
        &self,
        _command: ReviewRequestCommand,
    ) -> Result<OrganRequest, Error> {
        Err(Self::unavailable())
    }

    async fn reject_request(
        &self,
        _command: ReviewRequestCommand,
    ) -> Result<OrganRequest, Error> {
        Err(Self::unavailable())
    }

    async fn verify_donation(
        &self,
        _command: VerifyDonationCommand,
    ) -> Result<OrganDonation, Error> {
        Err(Self::unavailable())
    }

    async fn release_donation(
        &self,
        _command: ReleaseDonationCommand,
    ) -> Result<OrganDonation, Error> {
        Err(Self::unavailable())
    }

    async fn match_organs(&self, _command: MatchOrgansCommand) -> Result<MatchOutcome, Error> {
        Err(Self::unavailable())
    }

    async fn complete_transplant(
        &self,
        _command: CompleteTransplantCommand,
    ) -> Result<MatchOutcome, Error> {
        Err(Self::unavailable())
    }

    async fn record_transaction(
        &self,
        _command: RecordTransactionCommand,
    ) -> Result<LedgerEntry, Error> {
        Err(Self::unavailable())
    }
}
