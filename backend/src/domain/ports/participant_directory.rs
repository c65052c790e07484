//! Driving port for participant registration and verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Participant, ParticipantId, Role};

/// Request to register a new participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipantRequest {
    pub name: String,
    pub role: Role,
}

/// Request to set a participant's verification flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVerifiedRequest {
    /// Participant performing the verification; must hold an adjudicating
    /// role.
    pub actor_id: ParticipantId,
    pub participant_id: ParticipantId,
    pub verified: bool,
}

/// Driving port for participant directory operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Register a new, unverified participant.
    async fn register(&self, request: RegisterParticipantRequest) -> Result<Participant, Error>;

    /// Fetch a participant by id.
    async fn get(&self, participant_id: ParticipantId) -> Result<Participant, Error>;

    /// Flip a participant's verification flag. Only doctors and admins may
    /// call this.
    async fn set_verified(&self, request: SetVerifiedRequest) -> Result<Participant, Error>;
}

/// Fixture directory for tests that do not exercise participant flows.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParticipantDirectory;

#[async_trait]
impl ParticipantDirectory for FixtureParticipantDirectory {
    async fn register(&self, _request: RegisterParticipantRequest) -> Result<Participant, Error> {
        Err(Error::service_unavailable(
            "participant directory is not configured",
        ))
    }

    async fn get(&self, participant_id: ParticipantId) -> Result<Participant, Error> {
        Err(Error::not_found(format!(
            "participant {participant_id} not found"
        )))
    }

    async fn set_verified(&self, _request: SetVerifiedRequest) -> Result<Participant, Error> {
        Err(Error::service_unavailable(
            "participant directory is not configured",
        ))
    }
}
