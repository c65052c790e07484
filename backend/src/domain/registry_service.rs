//! Participant directory domain service.
//!
//! Implements the participant driving port on top of the participant and
//! ledger repositories: registration, lookups, and the doctor-gated
//! verification flag.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::domain::ports::{
    LedgerRepository, LedgerRepositoryError, ParticipantDirectory, ParticipantRepository,
    ParticipantRepositoryError, RegisterParticipantRequest, SetVerifiedRequest,
};
use crate::domain::{
    Error, LedgerAction, LedgerEntry, LedgerEntryDraft, Participant, ParticipantId,
    ParticipantName,
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

/// Participant directory service over participant and ledger repositories.
#[derive(Clone)]
pub struct RegistryService<P, L> {
    participants: Arc<P>,
    ledger: Arc<L>,
}

impl<P, L> RegistryService<P, L> {
    /// Create a new directory service.
    pub fn new(participants: Arc<P>, ledger: Arc<L>) -> Self {
        Self {
            participants,
            ledger,
        }
    }
}

impl<P, L> RegistryService<P, L>
where
    P: ParticipantRepository,
    L: LedgerRepository,
{
    async fn load_participant(&self, participant_id: &ParticipantId) -> Result<Participant, Error> {
        self.participants
            .find_by_id(participant_id)
            .await
            .map_err(map_participant_repo_error)?
            .ok_or_else(|| Error::not_found(format!("participant {participant_id} not found")))
    }

    async fn append_ledger(&self, draft: LedgerEntryDraft) -> Result<(), Error> {
        let entry = LedgerEntry::record(draft, Utc::now());
        self.ledger
            .append(&entry)
            .await
            .map_err(map_ledger_repo_error)
    }
}

#[async_trait]
impl<P, L> ParticipantDirectory for RegistryService<P, L>
where
    P: ParticipantRepository,
    L: LedgerRepository,
{
    async fn register(&self, request: RegisterParticipantRequest) -> Result<Participant, Error> {
        let name = ParticipantName::new(request.name)
            .map_err(|err| Error::invalid_request(format!("invalid participant name: {err}")))?;
        let participant = Participant::register(name, request.role, Utc::now());

        self.participants
            .save(&participant)
            .await
            .map_err(map_participant_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::ParticipantRegistered,
            actor_id: participant.id(),
            request_id: None,
            donation_id: None,
            metadata: json!({ "role": participant.role() }),
        })
        .await?;

        Ok(participant)
    }

    async fn get(&self, participant_id: ParticipantId) -> Result<Participant, Error> {
        self.load_participant(&participant_id).await
    }

    async fn set_verified(&self, request: SetVerifiedRequest) -> Result<Participant, Error> {
        let actor = self
            .participants
            .find_by_id(&request.actor_id)
            .await
            .map_err(map_participant_repo_error)?
            .ok_or_else(|| {
                Error::unauthorized(format!("actor {} is not registered", request.actor_id))
            })?;
        if !actor.role().can_adjudicate() {
            return Err(Error::forbidden(format!(
                "role {} may not verify participants",
                actor.role()
            )));
        }

        let mut participant = self.load_participant(&request.participant_id).await?;
        participant.set_verified(request.verified);

        self.participants
            .save(&participant)
            .await
            .map_err(map_participant_repo_error)?;

        self.append_ledger(LedgerEntryDraft {
            action: LedgerAction::VerificationUpdated,
            actor_id: request.actor_id,
            request_id: None,
            donation_id: None,
            metadata: json!({
                "participantId": request.participant_id,
                "verified": request.verified,
            }),
        })
        .await?;

        Ok(participant)
    }
}

#[cfg(test)]
#[path = "registry_service_tests.rs"]
mod tests;
