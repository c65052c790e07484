//! Matching and completion HTTP handlers.
//!
//! ```text
//! POST /api/v1/matches
//! POST /api/v1/matches/{request_id}/complete
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{CompleteTransplantCommand, MatchOrgansCommand, MatchOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::donations::OrganDonationBody;
use crate::inbound::http::requests::OrganRequestBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Request payload for matching a request with a donation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchOrgansBody {
    #[schema(format = "uuid")]
    pub request_id: String,
    #[schema(format = "uuid")]
    pub donation_id: String,
}

/// Both sides of a match or completion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcomeBody {
    pub request: OrganRequestBody,
    pub donation: OrganDonationBody,
}

impl From<MatchOutcome> for MatchOutcomeBody {
    fn from(value: MatchOutcome) -> Self {
        Self {
            request: OrganRequestBody::from(value.request),
            donation: OrganDonationBody::from(value.donation),
        }
    }
}

/// Match an approved request with an available donation. Doctors and admins
/// only.
#[utoipa::path(
    post,
    path = "/api/v1/matches",
    request_body = MatchOrgansBody,
    responses(
        (status = 200, description = "Organs matched", body = MatchOutcomeBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Request or donation not found", body = Error),
        (status = 409, description = "Either side is not in a matchable state", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["matching"],
    operation_id = "matchOrgans",
    security(("SessionCookie" = []))
)]
#[post("/matches")]
pub async fn match_organs(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MatchOrgansBody>,
) -> ApiResult<web::Json<MatchOutcomeBody>> {
    let actor_id = session.require_participant_id()?;
    let payload = payload.into_inner();
    let request_id = parse_uuid(payload.request_id, FieldName::new("requestId"))?;
    let donation_id = parse_uuid(payload.donation_id, FieldName::new("donationId"))?;

    let outcome = state
        .allocation
        .match_organs(MatchOrgansCommand {
            actor_id,
            request_id,
            donation_id,
        })
        .await?;

    Ok(web::Json(MatchOutcomeBody::from(outcome)))
}

/// Complete the transplant for a matched request. Doctors and admins only.
/// Completing an already completed pair returns the recorded outcome
/// unchanged.
#[utoipa::path(
    post,
    path = "/api/v1/matches/{request_id}/complete",
    params(("request_id" = uuid::Uuid, Path, description = "Matched request id")),
    responses(
        (status = 200, description = "Transplant completed", body = MatchOutcomeBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Request not found", body = Error),
        (status = 409, description = "Request has no matched donation", body = Error)
    ),
    tags = ["matching"],
    operation_id = "completeTransplant",
    security(("SessionCookie" = []))
)]
#[post("/matches/{request_id}/complete")]
pub async fn complete_transplant(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MatchOutcomeBody>> {
    let actor_id = session.require_participant_id()?;
    let request_id = parse_uuid(path.into_inner(), FieldName::new("requestId"))?;

    let outcome = state
        .allocation
        .complete_transplant(CompleteTransplantCommand {
            actor_id,
            request_id,
        })
        .await?;

    Ok(web::Json(MatchOutcomeBody::from(outcome)))
}

#[cfg(test)]
#[path = "matching_tests.rs"]
mod tests;
