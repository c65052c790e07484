//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. Regenerate with `diesel print-schema` when the migrations
//! change.

diesel::table! {
    /// Registered participants: patients, donors, doctors, and admins.
    participants (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Validated display name.
        name -> Varchar,
        /// Canonical role identifier (`patient`, `donor`, `doctor`, `admin`).
        role -> Varchar,
        /// Doctor-confirmed identity flag.
        verified -> Bool,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Patients' recorded needs for an organ type.
    organ_requests (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Requesting patient.
        patient_id -> Uuid,
        /// Canonical organ identifier.
        organ -> Varchar,
        /// Clinical urgency, 1 to 5.
        urgency -> SmallInt,
        /// Free-text clinical justification.
        medical_condition -> Text,
        /// Lifecycle status identifier.
        status -> Varchar,
        /// Allocated donation, present once matched.
        matched_donation_id -> Nullable<Uuid>,
        /// Notes recorded during adjudication.
        doctor_notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Donors' recorded offers of an organ type.
    organ_donations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Offering donor.
        donor_id -> Uuid,
        /// Canonical organ identifier.
        organ -> Varchar,
        /// Lifecycle status identifier.
        status -> Varchar,
        /// Doctor-confirmed eligibility flag.
        medical_clearance -> Bool,
        /// Notes recorded alongside the clearance decision.
        clearance_notes -> Nullable<Text>,
        /// Matched request, present once allocated.
        matched_request_id -> Nullable<Uuid>,
        /// Latitude of the retrieval site.
        latitude -> Nullable<Float8>,
        /// Longitude of the retrieval site.
        longitude -> Nullable<Float8>,
        /// Viability deadline.
        viable_until -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit ledger.
    ledger_entries (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Canonical action identifier.
        action -> Varchar,
        /// Participant who performed the action.
        actor_id -> Uuid,
        /// Referenced request, if any.
        request_id -> Nullable<Uuid>,
        /// Referenced donation, if any.
        donation_id -> Nullable<Uuid>,
        /// Lower-hex SHA-256 digest of the entry's canonical form.
        digest -> Varchar,
        /// Arbitrary JSON recorded with the entry.
        metadata -> Jsonb,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    participants,
    organ_requests,
    organ_donations,
    ledger_entries,
);
