//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{ledger_entries, organ_donations, organ_requests, participants};

/// Row struct for reading from the participants table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantRow {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating participant records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = participants)]
pub(crate) struct NewParticipantRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub role: &'a str,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for upserting participant records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = participants)]
pub(crate) struct ParticipantUpdate<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// Organ request models
// ---------------------------------------------------------------------------

/// Row struct for reading from the organ_requests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organ_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganRequestRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub organ: String,
    pub urgency: i16,
    pub medical_condition: String,
    pub status: String,
    pub matched_donation_id: Option<Uuid>,
    pub doctor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating organ request records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organ_requests)]
pub(crate) struct NewOrganRequestRow<'a> {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub organ: &'a str,
    pub urgency: i16,
    pub medical_condition: &'a str,
    pub status: &'a str,
    pub matched_donation_id: Option<Uuid>,
    pub doctor_notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for upserting organ request records.
///
/// Upserts mirror the full aggregate, so a `None` here must write NULL
/// rather than leaving the stored value in place.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organ_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrganRequestUpdate<'a> {
    pub urgency: i16,
    pub medical_condition: &'a str,
    pub status: &'a str,
    pub matched_donation_id: Option<Uuid>,
    pub doctor_notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Organ donation models
// ---------------------------------------------------------------------------

/// Row struct for reading from the organ_donations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organ_donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganDonationRow {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub organ: String,
    pub status: String,
    pub medical_clearance: bool,
    pub clearance_notes: Option<String>,
    pub matched_request_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating organ donation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organ_donations)]
pub(crate) struct NewOrganDonationRow<'a> {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub organ: &'a str,
    pub status: &'a str,
    pub medical_clearance: bool,
    pub clearance_notes: Option<&'a str>,
    pub matched_request_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for upserting organ donation records.
///
/// Upserts mirror the full aggregate, so a `None` here must write NULL
/// rather than leaving the stored value in place.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organ_donations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrganDonationUpdate<'a> {
    pub status: &'a str,
    pub medical_clearance: bool,
    pub clearance_notes: Option<&'a str>,
    pub matched_request_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub viable_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger models
// ---------------------------------------------------------------------------

/// Row struct for reading from the ledger_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub action: String,
    pub actor_id: Uuid,
    pub request_id: Option<Uuid>,
    pub donation_id: Option<Uuid>,
    pub digest: String,
    pub metadata: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries. The ledger is append
/// only, so no changeset struct exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub action: &'a str,
    pub actor_id: Uuid,
    pub request_id: Option<Uuid>,
    pub donation_id: Option<Uuid>,
    pub digest: &'a str,
    pub metadata: &'a serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}
