//! Port for participant persistence.

use async_trait::async_trait;

use crate::domain::{Participant, ParticipantId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by participant repository adapters.
    pub enum ParticipantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "participant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "participant repository query failed: {message}",
    }
}

/// Port for writing and reading participants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Persist a participant, inserting or updating by id.
    async fn save(&self, participant: &Participant) -> Result<(), ParticipantRepositoryError>;

    /// Find a participant by id.
    async fn find_by_id(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, ParticipantRepositoryError>;

    /// Count registered participants.
    async fn count(&self) -> Result<u64, ParticipantRepositoryError>;
}

/// Fixture implementation for tests that do not exercise participant
/// persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParticipantRepository;

#[async_trait]
impl ParticipantRepository for FixtureParticipantRepository {
    async fn save(&self, _participant: &Participant) -> Result<(), ParticipantRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, ParticipantRepositoryError> {
        Ok(None)
    }

    async fn count(&self) -> Result<u64, ParticipantRepositoryError> {
        Ok(0)
    }
}
