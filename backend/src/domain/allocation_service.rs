//! Allocation domain service.
//!
//! Implements the allocation command, allocation query, and ledger query
//! driving ports: the request and donation lifecycles, organ matching with
//! reciprocal cross-references, transplant completion, and the audit trail
//! that every mutation leaves behind.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    AllocationCommand, AllocationQuery, AllocationRepository, AllocationRepositoryError,
    CompleteTransplantCommand, CreateDonationCommand, CreateRequestCommand, LedgerQuery,
    LedgerRepository, LedgerRepositoryError, MatchOrgansCommand, MatchOutcome,
    ParticipantRepository, ParticipantRepositoryError, RecordTransactionCommand, RegistryStats,
    ReleaseDonationCommand, ReviewRequestCommand, VerifyDonationCommand,
};
use crate::domain::{
    DonationStatus, Error, LedgerAction, LedgerEntry, LedgerEntryDraft, LiveOrganView,
    OrganDonation, OrganRequest, OrganType, Participant, ParticipantId, RequestStatus, Role,
};

fn map_participant_repo_error(error: ParticipantRepositoryError) -> Error {
    match error {
        ParticipantRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("participant repository unavailable: {message}"))
        }
        ParticipantRepositoryError::Query { message } => {
            Error::internal(format!("participant repository error: {message}"))
        }
    }
}

fn map_allocation_repo_error(error: AllocationRepositoryError) -> Error {
    match error {
        AllocationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("allocation repository unavailable: {message}"))
        }
        AllocationRepositoryError::Query { message } => {
            Error::internal(format!("allocation repository error: {message}"))
        }
    }
}

fn map_ledger_repo_error(error: LedgerRepositoryError) -> Error {
    match error {
        LedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger repository unavailable: {message}"))
        }
        LedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger repository error: {message}"))
        }
    }
}

/// Allocation service over participant, allocation, and ledger repositories.
#[derive(Clone)]
pub struct AllocationService<P, A, L> {
    participants: Arc<P>,
    allocations: Arc<A>,
    ledger: Arc<L>,
}

impl<P, A, L> AllocationService<P, A, L> {
    /// Create a new allocation service.
    pub fn new(participants: Arc<P>, allocations: Arc<A>, ledger: Arc<L>) -> Self {
        Self {
            participants,
            allocations,
            ledger,
        }
    }
}

impl<P, A, L> AllocationService<P, A, L>
where
    P: ParticipantRepository,
    A: AllocationRepository,
    L: LedgerRepository,
{
    async fn load_actor(&self, actor_id: &ParticipantId) -> Result<Participant, Error> {
        self.participants
            .find_by_id(actor_id)
            .await
            .map_err(map_participant_repo_error)?
            .ok_or_else(|| Error::unauthorized(format!("actor {actor_id} is not registered")))
    }

    async fn load_adjudicator(&self, actor_id: &ParticipantId) -> Result<Participant, Error> {
        let actor = self.load_actor(actor_id).await?;
        if !actor.role().can_adjudicate() {
            return Err(Error::forbidden(format!(
                "role {} may not adjudicate allocations",
                actor.role()
            )));
        }
        Ok(actor)
    }

    async fn load_request(&self, request_id: &Uuid) -> Result<OrganRequest, Error> {
        self.allocations
            .find_request(request_id)
            .await
            .map_err(map_allocation_repo_error)?
            .ok_or_else(|| Error::not_found(format!("organ request {request_id} not found")))
    }

    async fn load_donation(&self, donation_id: &Uuid) -> Result<OrganDonation, Error> {
        self.allocations
            .find_donation(donation_id)
            .await
            .map_err(map_allocation_repo_error)?
            .ok_or_else(|| Error::not_found(format!("organ donation {donation_id} not found")))
    }

    async fn append_ledger(&self, draft: LedgerEntryDraft) -> Result<LedgerEntry, Error> {
        let entry = LedgerEntry::record(draft, Utc::now());
        self.ledger
            .append(&entry)
            .await
            .map_err(map_ledger_repo_error)?;
        Ok(entry)
    }
}

#[async_trait]
impl<P, A, L> AllocationCommand for AllocationService<P, A, L>
where
    P: ParticipantRepository,
    A: AllocationRepository,
    L: LedgerRepository,
{
    async fn create_request(
        &self,
        command: CreateRequestCommand,
    ) -> Result<OrganRequest, Error> {
        let actor = self.load_actor(&command.actor_id).await?;
        if actor.role() != Role::Patient {
            return Err(Error::forbidden(format!(
                "role {} may not open organ requests",
                actor.role()
            )));
        }

        let request = OrganRequest::open(
            actor.id(),
            command.organ,
            command.urgency,
            command.medical_condition,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(format!("invalid organ request: {err}")))?;

        self.allocations
            .save_request(&request)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::RequestCreated,
            actor_id: actor.id(),
            request_id: Some(request.id()),
            donation_id: None,
            metadata: json!({
                "organ": request.organ(),
                "urgency": request.urgency(),
            }),
        })
        .await?;

        Ok(request)
    }

    async fn create_donation(
        &self,
        command: CreateDonationCommand,
    ) -> Result<OrganDonation, Error> {
        let actor = self.load_actor(&command.actor_id).await?;
        if actor.role() != Role::Donor {
            return Err(Error::forbidden(format!(
                "role {} may not offer donations",
                actor.role()
            )));
        }

        let donation = OrganDonation::offer(
            actor.id(),
            command.organ,
            command.latitude,
            command.longitude,
            command.viable_until,
            Utc::now(),
        )
        .map_err(|err| Error::invalid_request(format!("invalid organ donation: {err}")))?;

        self.allocations
            .save_donation(&donation)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::DonationCreated,
            actor_id: actor.id(),
            request_id: None,
            donation_id: Some(donation.id()),
            metadata: json!({ "organ": donation.organ() }),
        })
        .await?;

        Ok(donation)
    }

    async fn approve_request(
        &self,
        command: ReviewRequestCommand,
    ) -> Result<OrganRequest, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut request = self.load_request(&command.request_id).await?;

        request
            .approve(command.notes, Utc::now())
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_request(&request)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::RequestApproved,
            actor_id: actor.id(),
            request_id: Some(request.id()),
            donation_id: None,
            metadata: json!({}),
        })
        .await?;

        Ok(request)
    }

    async fn reject_request(
        &self,
        command: ReviewRequestCommand,
    ) -> Result<OrganRequest, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut request = self.load_request(&command.request_id).await?;

        request
            .reject(command.notes, Utc::now())
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_request(&request)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::RequestRejected,
            actor_id: actor.id(),
            request_id: Some(request.id()),
            donation_id: None,
            metadata: json!({}),
        })
        .await?;

        Ok(request)
    }

    async fn verify_donation(
        &self,
        command: VerifyDonationCommand,
    ) -> Result<OrganDonation, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut donation = self.load_donation(&command.donation_id).await?;

        donation
            .verify(command.notes, Utc::now())
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_donation(&donation)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::DonationVerified,
            actor_id: actor.id(),
            request_id: None,
            donation_id: Some(donation.id()),
            metadata: json!({}),
        })
        .await?;

        Ok(donation)
    }

    async fn release_donation(
        &self,
        command: ReleaseDonationCommand,
    ) -> Result<OrganDonation, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut donation = self.load_donation(&command.donation_id).await?;

        donation
            .release(Utc::now())
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_donation(&donation)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::DonationReleased,
            actor_id: actor.id(),
            request_id: None,
            donation_id: Some(donation.id()),
            metadata: json!({}),
        })
        .await?;

        Ok(donation)
    }

    async fn match_organs(&self, command: MatchOrgansCommand) -> Result<MatchOutcome, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut request = self.load_request(&command.request_id).await?;
        let mut donation = self.load_donation(&command.donation_id).await?;

        if request.organ() != donation.organ() {
            return Err(Error::invalid_request("organ types do not match")
                .with_details(json!({
                    "requestOrgan": request.organ(),
                    "donationOrgan": donation.organ(),
                })));
        }
        if request.status() != RequestStatus::Approved {
            return Err(Error::conflict(format!(
                "organ request {} is {}, not approved",
                request.id(),
                request.status()
            )));
        }
        if donation.status() != DonationStatus::Available {
            return Err(Error::conflict(format!(
                "organ donation {} is {}, not available",
                donation.id(),
                donation.status()
            )));
        }
        if !donation.medical_clearance() {
            return Err(Error::conflict(format!(
                "organ donation {} lacks medical clearance",
                donation.id()
            )));
        }

        let now = Utc::now();
        request
            .mark_matched(donation.id(), now)
            .map_err(|err| Error::conflict(err.to_string()))?;
        donation
            .allocate(request.id(), now)
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_match(&request, &donation)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::OrgansMatched,
            actor_id: actor.id(),
            request_id: Some(request.id()),
            donation_id: Some(donation.id()),
            metadata: json!({ "organ": request.organ() }),
        })
        .await?;

        Ok(MatchOutcome { request, donation })
    }

    async fn complete_transplant(
        &self,
        command: CompleteTransplantCommand,
    ) -> Result<MatchOutcome, Error> {
        let actor = self.load_adjudicator(&command.actor_id).await?;
        let mut request = self.load_request(&command.request_id).await?;

        let donation_id = request.matched_donation_id().ok_or_else(|| {
            Error::conflict(format!(
                "organ request {} is {}, not matched",
                request.id(),
                request.status()
            ))
        })?;
        let mut donation = self.load_donation(&donation_id).await?;

        // Replayed completions return the recorded outcome unchanged.
        if request.status() == RequestStatus::Transplanted {
            return Ok(MatchOutcome { request, donation });
        }

        let now = Utc::now();
        request
            .mark_transplanted(now)
            .map_err(|err| Error::conflict(err.to_string()))?;
        donation
            .complete(now)
            .map_err(|err| Error::conflict(err.to_string()))?;

        self.allocations
            .save_completion(&request, &donation)
            .await
            .map_err(map_allocation_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::TransplantCompleted,
            actor_id: actor.id(),
            request_id: Some(request.id()),
            donation_id: Some(donation.id()),
            metadata: json!({ "organ": request.organ() }),
        })
        .await?;

        Ok(MatchOutcome { request, donation })
    }

    async fn record_transaction(
        &self,
        command: RecordTransactionCommand,
    ) -> Result<LedgerEntry, Error> {
        let actor = self.load_actor(&command.actor_id).await?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::ManualNote,
            actor_id: actor.id(),
            request_id: command.request_id,
            donation_id: command.donation_id,
            metadata: command.metadata,
        })
        .await
    }
}

#[async_trait]
impl<P, A, L> AllocationQuery for AllocationService<P, A, L>
where
    P: ParticipantRepository,
    A: AllocationRepository,
    L: LedgerRepository,
{
    async fn get_request(&self, request_id: Uuid) -> Result<OrganRequest, Error> {
        self.load_request(&request_id).await
    }

    async fn get_donation(&self, donation_id: Uuid) -> Result<OrganDonation, Error> {
        self.load_donation(&donation_id).await
    }

    async fn list_pending_requests(
        &self,
        organ: OrganType,
    ) -> Result<Vec<OrganRequest>, Error> {
        self.allocations
            .list_pending_requests(organ)
            .await
            .map_err(map_allocation_repo_error)
    }

    async fn list_live_organs(&self) -> Result<Vec<LiveOrganView>, Error> {
        let donations = self
            .allocations
            .list_available_donations()
            .await
            .map_err(map_allocation_repo_error)?;

        Ok(donations
            .iter()
            .filter_map(LiveOrganView::from_donation)
            .collect())
    }

    async fn registry_stats(&self) -> Result<RegistryStats, Error> {
        let participants = self
            .participants
            .count()
            .await
            .map_err(map_participant_repo_error)?;
        let counts = self
            .allocations
            .stats()
            .await
            .map_err(map_allocation_repo_error)?;

        Ok(RegistryStats {
            participants,
            requests: counts.requests,
            donations: counts.donations,
            matched: counts.matched,
            completed: counts.completed,
        })
    }
}

#[async_trait]
impl<P, A, L> LedgerQuery for AllocationService<P, A, L>
where
    P: ParticipantRepository,
    A: AllocationRepository,
    L: LedgerRepository,
{
    async fn entries_for_request(&self, request_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        self.ledger
            .list_for_request(&request_id)
            .await
            .map_err(map_ledger_repo_error)
    }

    async fn entries_for_donation(&self, donation_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        self.ledger
            .list_for_donation(&donation_id)
            .await
            .map_err(map_ledger_repo_error)
    }
}

#[cfg(test)]
#[path = "allocation_service_tests.rs"]
mod tests;
