//! Participant HTTP handlers.
//!
//! ```text
//! POST  /api/v1/participants
//! POST  /api/v1/login
//! GET   /api/v1/participants/{id}
//! PATCH /api/v1/participants/{id}/verification
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{RegisterParticipantRequest, SetVerifiedRequest};
use crate::domain::{Error, Participant, ParticipantId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_role, parse_uuid};

/// Request payload for registering a participant.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipantBody {
    pub name: String,
    /// One of `patient`, `donor`, `doctor`, or `admin`.
    pub role: String,
}

/// Request payload for logging in as an existing participant.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[schema(format = "uuid")]
    pub participant_id: String,
}

/// Request payload for updating a participant's verification flag.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetVerifiedBody {
    pub verified: bool,
}

/// Participant representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub role: String,
    pub verified: bool,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Participant> for ParticipantBody {
    fn from(value: Participant) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_string(),
            role: value.role().to_string(),
            verified: value.verified(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Register a new participant and start a session for them.
#[utoipa::path(
    post,
    path = "/api/v1/participants",
    request_body = RegisterParticipantBody,
    responses(
        (status = 200, description = "Participant registered", body = ParticipantBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["participants"],
    operation_id = "registerParticipant",
    security([])
)]
#[post("/participants")]
pub async fn register_participant(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterParticipantBody>,
) -> ApiResult<web::Json<ParticipantBody>> {
    let payload = payload.into_inner();
    let role = parse_role(payload.role, FieldName::new("role"))?;

    let participant = state
        .directory
        .register(RegisterParticipantRequest {
            name: payload.name,
            role,
        })
        .await?;
    session.persist_participant(&participant.id())?;

    Ok(web::Json(ParticipantBody::from(participant)))
}

/// Establish a session for a registered participant.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = ParticipantBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Participant not found", body = Error)
    ),
    tags = ["participants"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<ParticipantBody>> {
    let raw = payload.into_inner().participant_id;
    let participant_id =
        ParticipantId::from_uuid(parse_uuid(raw, FieldName::new("participantId"))?);

    let participant = state.directory.get(participant_id).await?;
    session.persist_participant(&participant.id())?;

    Ok(web::Json(ParticipantBody::from(participant)))
}

/// Fetch a participant by id.
#[utoipa::path(
    get,
    path = "/api/v1/participants/{id}",
    params(("id" = uuid::Uuid, Path, description = "Participant id")),
    responses(
        (status = 200, description = "Participant found", body = ParticipantBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Participant not found", body = Error)
    ),
    tags = ["participants"],
    operation_id = "getParticipant",
    security(("SessionCookie" = []))
)]
#[get("/participants/{id}")]
pub async fn get_participant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ParticipantBody>> {
    let participant_id =
        ParticipantId::from_uuid(parse_uuid(path.into_inner(), FieldName::new("id"))?);

    let participant = state.directory.get(participant_id).await?;

    Ok(web::Json(ParticipantBody::from(participant)))
}

/// Set a participant's verification flag. Doctors and admins only.
#[utoipa::path(
    patch,
    path = "/api/v1/participants/{id}/verification",
    params(("id" = uuid::Uuid, Path, description = "Participant id")),
    request_body = SetVerifiedBody,
    responses(
        (status = 200, description = "Verification updated", body = ParticipantBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Participant not found", body = Error)
    ),
    tags = ["participants"],
    operation_id = "setParticipantVerification",
    security(("SessionCookie" = []))
)]
#[patch("/participants/{id}/verification")]
pub async fn set_participant_verification(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SetVerifiedBody>,
) -> ApiResult<web::Json<ParticipantBody>> {
    let actor_id = session.require_participant_id()?;
    let participant_id =
        ParticipantId::from_uuid(parse_uuid(path.into_inner(), FieldName::new("id"))?);

    let participant = state
        .directory
        .set_verified(SetVerifiedRequest {
            actor_id,
            participant_id,
            verified: payload.verified,
        })
        .await?;

    Ok(web::Json(ParticipantBody::from(participant)))
}

#[cfg(test)]
#[path = "participants_tests.rs"]
mod tests;
