//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! The ledger is append only: this adapter inserts and reads, never updates
//! or deletes. Digests are stored verbatim so rehydrated entries keep the
//! hash computed at recording time.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError};
use crate::domain::{LedgerAction, LedgerEntry, ParticipantId};

use super::diesel_error_mapping;
use super::models::{LedgerEntryRow, NewLedgerEntryRow};
use super::pool::{DbPool, PoolError};
use super::schema::ledger_entries;

/// Diesel-backed implementation of the ledger repository port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerRepositoryError {
    diesel_error_mapping::map_pool_error(error, |message| {
        LedgerRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> LedgerRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        LedgerRepositoryError::query,
        LedgerRepositoryError::connection,
    )
}

/// Convert a database row into a domain ledger entry.
fn row_to_entry(row: LedgerEntryRow) -> Result<LedgerEntry, LedgerRepositoryError> {
    let action = row
        .action
        .parse::<LedgerAction>()
        .map_err(|err| LedgerRepositoryError::query(format!("decode action: {err}")))?;

    Ok(LedgerEntry::from_parts(
        row.id,
        action,
        ParticipantId::from_uuid(row.actor_id),
        row.request_id,
        row.donation_id,
        row.digest,
        row.metadata,
        row.recorded_at,
    ))
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewLedgerEntryRow {
            id: entry.id(),
            action: entry.action().as_str(),
            actor_id: *entry.actor_id().as_uuid(),
            request_id: entry.request_id(),
            donation_id: entry.donation_id(),
            digest: entry.digest(),
            metadata: entry.metadata(),
            recorded_at: entry.recorded_at(),
        };

        diesel::insert_into(ledger_entries::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .filter(ledger_entries::request_id.eq(request_id))
            .order(ledger_entries::recorded_at.asc())
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn list_for_donation(
        &self,
        donation_id: &Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .filter(ledger_entries::donation_id.eq(donation_id))
            .order(ledger_entries::recorded_at.asc())
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    #[fixture]
    fn valid_row() -> LedgerEntryRow {
        LedgerEntryRow {
            id: Uuid::new_v4(),
            action: "organs_matched".to_owned(),
            actor_id: Uuid::new_v4(),
            request_id: Some(Uuid::new_v4()),
            donation_id: Some(Uuid::new_v4()),
            digest: "ab".repeat(32),
            metadata: json!({}),
            recorded_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, LedgerRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_conversion_preserves_the_stored_digest(valid_row: LedgerEntryRow) {
        let digest = valid_row.digest.clone();
        let entry = row_to_entry(valid_row).expect("valid row converts");

        assert_eq!(entry.action(), LedgerAction::OrgansMatched);
        assert_eq!(entry.digest(), digest);
    }

    #[rstest]
    fn row_conversion_rejects_unknown_actions(mut valid_row: LedgerEntryRow) {
        valid_row.action = "reindexed".to_owned();

        let error = row_to_entry(valid_row).expect_err("unknown action should fail");
        assert!(matches!(error, LedgerRepositoryError::Query { .. }));
        assert!(error.to_string().contains("decode action"));
    }
}
