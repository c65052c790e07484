//! PostgreSQL-backed `ParticipantRepository` implementation using Diesel ORM.
//!
//! Persists participants and rehydrates them through the validated domain
//! constructors.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ParticipantRepository, ParticipantRepositoryError};
use crate::domain::{Participant, ParticipantId, ParticipantName, Role};

use super::diesel_error_mapping;
use super::models::{NewParticipantRow, ParticipantRow, ParticipantUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::participants;

/// Diesel-backed implementation of the participant repository port.
#[derive(Clone)]
pub struct DieselParticipantRepository {
    pool: DbPool,
}

impl DieselParticipantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ParticipantRepositoryError {
    diesel_error_mapping::map_pool_error(error, |message| {
        ParticipantRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> ParticipantRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        ParticipantRepositoryError::query,
        ParticipantRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain participant.
fn row_to_participant(row: ParticipantRow) -> Result<Participant, ParticipantRepositoryError> {
    let name = ParticipantName::new(row.name)
        .map_err(|err| ParticipantRepositoryError::query(format!("decode name: {err}")))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| ParticipantRepositoryError::query(format!("decode role: {err}")))?;

    Ok(Participant::from_parts(
        ParticipantId::from_uuid(row.id),
        name,
        role,
        row.verified,
        row.created_at,
    ))
}

#[async_trait]
impl ParticipantRepository for DieselParticipantRepository {
    async fn save(&self, participant: &Participant) -> Result<(), ParticipantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewParticipantRow {
            id: *participant.id().as_uuid(),
            name: participant.name().as_ref(),
            role: participant.role().as_str(),
            verified: participant.verified(),
            created_at: participant.created_at(),
        };
        let update_row = ParticipantUpdate {
            name: participant.name().as_ref(),
            role: participant.role().as_str(),
            verified: participant.verified(),
        };

        diesel::insert_into(participants::table)
            .values(&new_row)
            .on_conflict(participants::id)
            .do_update()
            .set(&update_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<Option<Participant>, ParticipantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = participants::table
            .filter(participants::id.eq(participant_id.as_uuid()))
            .select(ParticipantRow::as_select())
            .first::<ParticipantRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_participant).transpose()
    }

    async fn count(&self) -> Result<u64, ParticipantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = participants::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn valid_row() -> ParticipantRow {
        ParticipantRow {
            id: Uuid::new_v4(),
            name: "Ada Lovelace".to_owned(),
            role: "doctor".to_owned(),
            verified: true,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(
            repo_err,
            ParticipantRepositoryError::Connection { .. }
        ));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn row_conversion_rehydrates_the_participant(valid_row: ParticipantRow) {
        let expected_id = valid_row.id;
        let participant = row_to_participant(valid_row).expect("valid row converts");

        assert_eq!(*participant.id().as_uuid(), expected_id);
        assert_eq!(participant.role(), Role::Doctor);
        assert!(participant.verified());
    }

    #[rstest]
    fn row_conversion_rejects_unknown_roles(mut valid_row: ParticipantRow) {
        valid_row.role = "surgeon".to_owned();

        let error = row_to_participant(valid_row).expect_err("unknown role should fail");
        assert!(matches!(error, ParticipantRepositoryError::Query { .. }));
        assert!(error.to_string().contains("decode role"));
    }

    #[rstest]
    fn row_conversion_rejects_invalid_names(mut valid_row: ParticipantRow) {
        valid_row.name = "  ".to_owned();

        let error = row_to_participant(valid_row).expect_err("blank name should fail");
        assert!(matches!(error, ParticipantRepositoryError::Query { .. }));
        assert!(error.to_string().contains("decode name"));
    }
}
