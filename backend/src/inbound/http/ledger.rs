//! Audit ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/ledger
//! GET  /api/v1/ledger?requestId={id}
//! GET  /api/v1/ledger?donationId={id}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::RecordTransactionCommand;
use crate::domain::{Error, LedgerEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for appending a manual ledger note.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionBody {
    #[schema(format = "uuid")]
    pub request_id: Option<String>,
    #[schema(format = "uuid")]
    pub donation_id: Option<String>,
    /// Free-form JSON payload stored alongside the entry.
    #[serde(default)]
    pub metadata: Value,
}

/// Query parameters for the ledger listing. Exactly one of the two filters
/// must be supplied.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQueryParams {
    #[schema(format = "uuid")]
    pub request_id: Option<String>,
    #[schema(format = "uuid")]
    pub donation_id: Option<String>,
}

/// Ledger entry representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub action: String,
    #[schema(format = "uuid")]
    pub actor_id: String,
    #[schema(format = "uuid")]
    pub request_id: Option<String>,
    #[schema(format = "uuid")]
    pub donation_id: Option<String>,
    /// SHA-256 digest binding the entry to its action, subjects, actor, and
    /// timestamp.
    pub digest: String,
    pub metadata: Value,
    #[schema(format = "date-time")]
    pub recorded_at: String,
}

impl From<LedgerEntry> for LedgerEntryBody {
    fn from(value: LedgerEntry) -> Self {
        Self {
            id: value.id().to_string(),
            action: value.action().to_string(),
            actor_id: value.actor_id().to_string(),
            request_id: value.request_id().map(|id| id.to_string()),
            donation_id: value.donation_id().map(|id| id.to_string()),
            digest: value.digest().to_owned(),
            metadata: value.metadata().clone(),
            recorded_at: value.recorded_at().to_rfc3339(),
        }
    }
}

/// Append a manual note to the audit ledger.
#[utoipa::path(
    post,
    path = "/api/v1/ledger",
    request_body = RecordTransactionBody,
    responses(
        (status = 200, description = "Entry recorded", body = LedgerEntryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["ledger"],
    operation_id = "recordTransaction",
    security(("SessionCookie" = []))
)]
#[post("/ledger")]
pub async fn record_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecordTransactionBody>,
) -> ApiResult<web::Json<LedgerEntryBody>> {
    let actor_id = session.require_participant_id()?;
    let payload = payload.into_inner();
    let request_id = payload
        .request_id
        .map(|raw| parse_uuid(raw, FieldName::new("requestId")))
        .transpose()?;
    let donation_id = payload
        .donation_id
        .map(|raw| parse_uuid(raw, FieldName::new("donationId")))
        .transpose()?;

    let entry = state
        .allocation
        .record_transaction(RecordTransactionCommand {
            actor_id,
            request_id,
            donation_id,
            metadata: payload.metadata,
        })
        .await?;

    Ok(web::Json(LedgerEntryBody::from(entry)))
}

/// List ledger entries for a request or a donation, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/ledger",
    params(
        ("requestId" = Option<uuid::Uuid>, Query, description = "Filter by request id"),
        ("donationId" = Option<uuid::Uuid>, Query, description = "Filter by donation id")
    ),
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntryBody]),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["ledger"],
    operation_id = "listLedgerEntries",
    security(("SessionCookie" = []))
)]
#[get("/ledger")]
pub async fn list_ledger_entries(
    state: web::Data<HttpState>,
    query: web::Query<LedgerQueryParams>,
) -> ApiResult<web::Json<Vec<LedgerEntryBody>>> {
    let query = query.into_inner();

    let entries = match (query.request_id, query.donation_id) {
        (Some(raw), None) => {
            let request_id = parse_uuid(raw, FieldName::new("requestId"))?;
            state.ledger.entries_for_request(request_id).await?
        }
        (None, Some(raw)) => {
            let donation_id = parse_uuid(raw, FieldName::new("donationId"))?;
            state.ledger.entries_for_donation(donation_id).await?
        }
        _ => {
            return Err(Error::invalid_request(
                "exactly one of requestId or donationId must be provided",
            ));
        }
    };

    Ok(web::Json(
        entries.into_iter().map(LedgerEntryBody::from).collect(),
    ))
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
