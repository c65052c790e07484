//! PostgreSQL-backed `AllocationRepository` implementation using Diesel ORM.
//!
//! Persists organ requests and donations and rehydrates them through the
//! validated domain constructors. Matching and completion write both
//! aggregates inside a single transaction so the reciprocal references never
//! diverge.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{AllocationCounts, AllocationRepository, AllocationRepositoryError};
use crate::domain::{
    OrganDonation, OrganDonationDraft, OrganRequest, OrganRequestDraft, OrganType, ParticipantId,
    Urgency,
};

use super::diesel_error_mapping;
use super::models::{
    NewOrganDonationRow, NewOrganRequestRow, OrganDonationRow, OrganDonationUpdate,
    OrganRequestRow, OrganRequestUpdate,
};
use super::pool::{DbPool, PoolError};
use super::schema::{organ_donations, organ_requests};

/// Diesel-backed implementation of the allocation repository port.
#[derive(Clone)]
pub struct DieselAllocationRepository {
    pool: DbPool,
}

impl DieselAllocationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AllocationRepositoryError {
    diesel_error_mapping::map_pool_error(error, |message| {
        AllocationRepositoryError::connection(message)
    })
}

fn map_diesel_error(error: diesel::result::Error) -> AllocationRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        AllocationRepositoryError::query,
        AllocationRepositoryError::connection,
    )
}

fn decode_error(field: &str, err: impl std::fmt::Display) -> AllocationRepositoryError {
    AllocationRepositoryError::query(format!("decode {field}: {err}"))
}

/// Convert a database row into a validated domain organ request.
fn row_to_request(row: OrganRequestRow) -> Result<OrganRequest, AllocationRepositoryError> {
    let organ = row
        .organ
        .parse::<OrganType>()
        .map_err(|err| decode_error("organ", err))?;
    let status = row
        .status
        .parse()
        .map_err(|err| decode_error("status", err))?;
    let urgency = u8::try_from(row.urgency)
        .map_err(|err| decode_error("urgency", err))
        .and_then(|value| Urgency::new(value).map_err(|err| decode_error("urgency", err)))?;

    OrganRequest::new(OrganRequestDraft {
        id: row.id,
        patient_id: ParticipantId::from_uuid(row.patient_id),
        organ,
        urgency,
        medical_condition: row.medical_condition,
        status,
        matched_donation_id: row.matched_donation_id,
        doctor_notes: row.doctor_notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| AllocationRepositoryError::query(err.to_string()))
}

/// Convert a database row into a validated domain organ donation.
fn row_to_donation(row: OrganDonationRow) -> Result<OrganDonation, AllocationRepositoryError> {
    let organ = row
        .organ
        .parse::<OrganType>()
        .map_err(|err| decode_error("organ", err))?;
    let status = row
        .status
        .parse()
        .map_err(|err| decode_error("status", err))?;

    OrganDonation::new(OrganDonationDraft {
        id: row.id,
        donor_id: ParticipantId::from_uuid(row.donor_id),
        organ,
        status,
        medical_clearance: row.medical_clearance,
        clearance_notes: row.clearance_notes,
        matched_request_id: row.matched_request_id,
        latitude: row.latitude,
        longitude: row.longitude,
        viable_until: row.viable_until,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| AllocationRepositoryError::query(err.to_string()))
}

fn request_rows(request: &OrganRequest) -> (NewOrganRequestRow<'_>, OrganRequestUpdate<'_>) {
    let urgency = i16::from(request.urgency().get());
    let new_row = NewOrganRequestRow {
        id: request.id(),
        patient_id: *request.patient_id().as_uuid(),
        organ: request.organ().as_str(),
        urgency,
        medical_condition: request.medical_condition(),
        status: request.status().as_str(),
        matched_donation_id: request.matched_donation_id(),
        doctor_notes: request.doctor_notes(),
        created_at: request.created_at(),
        updated_at: request.updated_at(),
    };
    let update_row = OrganRequestUpdate {
        urgency,
        medical_condition: request.medical_condition(),
        status: request.status().as_str(),
        matched_donation_id: request.matched_donation_id(),
        doctor_notes: request.doctor_notes(),
        updated_at: request.updated_at(),
    };
    (new_row, update_row)
}

fn donation_rows(donation: &OrganDonation) -> (NewOrganDonationRow<'_>, OrganDonationUpdate<'_>) {
    let new_row = NewOrganDonationRow {
        id: donation.id(),
        donor_id: *donation.donor_id().as_uuid(),
        organ: donation.organ().as_str(),
        status: donation.status().as_str(),
        medical_clearance: donation.medical_clearance(),
        clearance_notes: donation.clearance_notes(),
        matched_request_id: donation.matched_request_id(),
        latitude: donation.latitude(),
        longitude: donation.longitude(),
        viable_until: donation.viable_until(),
        created_at: donation.created_at(),
        updated_at: donation.updated_at(),
    };
    let update_row = OrganDonationUpdate {
        status: donation.status().as_str(),
        medical_clearance: donation.medical_clearance(),
        clearance_notes: donation.clearance_notes(),
        matched_request_id: donation.matched_request_id(),
        latitude: donation.latitude(),
        longitude: donation.longitude(),
        viable_until: donation.viable_until(),
        updated_at: donation.updated_at(),
    };
    (new_row, update_row)
}

impl DieselAllocationRepository {
    /// Upsert both sides of a pair inside one transaction.
    async fn save_pair(
        &self,
        request: &OrganRequest,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (new_request, request_update) = request_rows(request);
        let (new_donation, donation_update) = donation_rows(donation);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(organ_requests::table)
                    .values(&new_request)
                    .on_conflict(organ_requests::id)
                    .do_update()
                    .set(&request_update)
                    .execute(conn)
                    .await?;

                diesel::insert_into(organ_donations::table)
                    .values(&new_donation)
                    .on_conflict(organ_donations::id)
                    .do_update()
                    .set(&donation_update)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[async_trait]
impl AllocationRepository for DieselAllocationRepository {
    async fn save_request(
        &self,
        request: &OrganRequest,
    ) -> Result<(), AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (new_row, update_row) = request_rows(request);

        diesel::insert_into(organ_requests::table)
            .values(&new_row)
            .on_conflict(organ_requests::id)
            .do_update()
            .set(&update_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<OrganRequest>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = organ_requests::table
            .filter(organ_requests::id.eq(request_id))
            .select(OrganRequestRow::as_select())
            .first::<OrganRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_request).transpose()
    }

    async fn list_pending_requests(
        &self,
        organ: OrganType,
    ) -> Result<Vec<OrganRequest>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganRequestRow> = organ_requests::table
            .filter(
                organ_requests::status
                    .eq("pending")
                    .and(organ_requests::organ.eq(organ.as_str())),
            )
            .order((
                organ_requests::urgency.desc(),
                organ_requests::created_at.asc(),
            ))
            .select(OrganRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_request).collect()
    }

    async fn save_donation(
        &self,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (new_row, update_row) = donation_rows(donation);

        diesel::insert_into(organ_donations::table)
            .values(&new_row)
            .on_conflict(organ_donations::id)
            .do_update()
            .set(&update_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_donation(
        &self,
        donation_id: &Uuid,
    ) -> Result<Option<OrganDonation>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = organ_donations::table
            .filter(organ_donations::id.eq(donation_id))
            .select(OrganDonationRow::as_select())
            .first::<OrganDonationRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_donation).transpose()
    }

    async fn list_available_donations(
        &self,
    ) -> Result<Vec<OrganDonation>, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrganDonationRow> = organ_donations::table
            .filter(organ_donations::status.eq("available"))
            .order(organ_donations::updated_at.asc())
            .select(OrganDonationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_donation).collect()
    }

    async fn save_match(
        &self,
        request: &OrganRequest,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        self.save_pair(request, donation).await
    }

    async fn save_completion(
        &self,
        request: &OrganRequest,
        donation: &OrganDonation,
    ) -> Result<(), AllocationRepositoryError> {
        self.save_pair(request, donation).await
    }

    async fn stats(&self) -> Result<AllocationCounts, AllocationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (requests, donations, matched, completed) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let requests: i64 = organ_requests::table.count().get_result(conn).await?;
                    let donations: i64 = organ_donations::table.count().get_result(conn).await?;
                    let matched: i64 = organ_requests::table
                        .filter(organ_requests::status.eq("matched"))
                        .count()
                        .get_result(conn)
                        .await?;
                    let completed: i64 = organ_requests::table
                        .filter(organ_requests::status.eq("transplanted"))
                        .count()
                        .get_result(conn)
                        .await?;
                    Ok((requests, donations, matched, completed))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(AllocationCounts {
            requests: requests.unsigned_abs(),
            donations: donations.unsigned_abs(),
            matched: matched.unsigned_abs(),
            completed: completed.unsigned_abs(),
        })
    }
}
