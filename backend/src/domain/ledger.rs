//! Append-only audit ledger.
//!
//! Every successful mutation in the registry appends one entry. PostgreSQL
//! rows are authoritative; the ledger is derived audit data whose `digest`
//! column stands in for a chain transaction hash.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::participant::ParticipantId;

/// Audited registry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    ParticipantRegistered,
    VerificationUpdated,
    RequestCreated,
    RequestApproved,
    RequestRejected,
    DonationCreated,
    DonationVerified,
    DonationReleased,
    OrgansMatched,
    TransplantCompleted,
    ManualNote,
}

impl LedgerAction {
    /// Canonical lower-case identifier used in storage and the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParticipantRegistered => "participant_registered",
            Self::VerificationUpdated => "verification_updated",
            Self::RequestCreated => "request_created",
            Self::RequestApproved => "request_approved",
            Self::RequestRejected => "request_rejected",
            Self::DonationCreated => "donation_created",
            Self::DonationVerified => "donation_verified",
            Self::DonationReleased => "donation_released",
            Self::OrgansMatched => "organs_matched",
            Self::TransplantCompleted => "transplant_completed",
            Self::ManualNote => "manual_note",
        }
    }
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`LedgerAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLedgerActionError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseLedgerActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ledger action: {}", self.input)
    }
}

impl std::error::Error for ParseLedgerActionError {}

impl FromStr for LedgerAction {
    type Err = ParseLedgerActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "participant_registered" => Ok(Self::ParticipantRegistered),
            "verification_updated" => Ok(Self::VerificationUpdated),
            "request_created" => Ok(Self::RequestCreated),
            "request_approved" => Ok(Self::RequestApproved),
            "request_rejected" => Ok(Self::RequestRejected),
            "donation_created" => Ok(Self::DonationCreated),
            "donation_verified" => Ok(Self::DonationVerified),
            "donation_released" => Ok(Self::DonationReleased),
            "organs_matched" => Ok(Self::OrgansMatched),
            "transplant_completed" => Ok(Self::TransplantCompleted),
            "manual_note" => Ok(Self::ManualNote),
            _ => Err(ParseLedgerActionError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Parts for recording a fresh [`LedgerEntry`].
#[derive(Debug, Clone)]
pub struct LedgerEntryDraft {
    pub action: LedgerAction,
    pub actor_id: ParticipantId,
    pub request_id: Option<Uuid>,
    pub donation_id: Option<Uuid>,
    pub metadata: Value,
}

/// One append-only audit record.
///
/// ## Invariants
/// - Entries are never mutated or deleted after recording.
/// - `digest` is the lower-hex SHA-256 of the canonical rendering of the
///   entry, fixed at recording time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    id: Uuid,
    action: LedgerAction,
    actor_id: ParticipantId,
    request_id: Option<Uuid>,
    donation_id: Option<Uuid>,
    digest: String,
    metadata: Value,
    recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record a new entry, computing its digest.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use transplant_registry::domain::{LedgerAction, LedgerEntry, LedgerEntryDraft, ParticipantId};
    ///
    /// let entry = LedgerEntry::record(
    ///     LedgerEntryDraft {
    ///         action: LedgerAction::ManualNote,
    ///         actor_id: ParticipantId::random(),
    ///         request_id: None,
    ///         donation_id: None,
    ///         metadata: json!({ "note": "reviewed" }),
    ///     },
    ///     chrono::Utc::now(),
    /// );
    /// assert_eq!(entry.digest().len(), 64);
    /// ```
    pub fn record(draft: LedgerEntryDraft, recorded_at: DateTime<Utc>) -> Self {
        let digest = compute_digest(&draft, recorded_at);
        Self {
            id: Uuid::new_v4(),
            action: draft.action,
            actor_id: draft.actor_id,
            request_id: draft.request_id,
            donation_id: draft.donation_id,
            digest,
            metadata: draft.metadata,
            recorded_at,
        }
    }

    /// Rebuild an entry from already-persisted parts, preserving its digest.
    #[expect(clippy::too_many_arguments, reason = "storage rehydration mirrors the row shape")]
    pub fn from_parts(
        id: Uuid,
        action: LedgerAction,
        actor_id: ParticipantId,
        request_id: Option<Uuid>,
        donation_id: Option<Uuid>,
        digest: String,
        metadata: Value,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action,
            actor_id,
            request_id,
            donation_id,
            digest,
            metadata,
            recorded_at,
        }
    }

    /// Entry identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Audited action.
    pub const fn action(&self) -> LedgerAction {
        self.action
    }

    /// Participant who performed the action.
    pub const fn actor_id(&self) -> ParticipantId {
        self.actor_id
    }

    /// Referenced request, if any.
    pub const fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    /// Referenced donation, if any.
    pub const fn donation_id(&self) -> Option<Uuid> {
        self.donation_id
    }

    /// Lower-hex SHA-256 digest standing in for a chain transaction hash.
    pub fn digest(&self) -> &str {
        self.digest.as_str()
    }

    /// Arbitrary JSON recorded with the entry.
    pub const fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Recording timestamp.
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

fn uuid_or_dash(id: Option<Uuid>) -> String {
    id.map_or_else(|| "-".to_owned(), |id| id.to_string())
}

/// Canonical digest over `action|request|donation|actor|timestamp`.
fn compute_digest(draft: &LedgerEntryDraft, recorded_at: DateTime<Utc>) -> String {
    let canonical = format!(
        "{}|{}|{}|{}|{}",
        draft.action,
        uuid_or_dash(draft.request_id),
        uuid_or_dash(draft.donation_id),
        draft.actor_id,
        recorded_at.to_rfc3339(),
    );
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
