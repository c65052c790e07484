//! Organ request HTTP handlers.
//!
//! ```text
//! POST /api/v1/requests
//! GET  /api/v1/requests/{id}
//! GET  /api/v1/requests/pending?organ={organ}
//! POST /api/v1/requests/{id}/approve
//! POST /api/v1/requests/{id}/reject
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateRequestCommand, ReviewRequestCommand};
use crate::domain::{Error, OrganRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_organ, parse_urgency, parse_uuid};

/// Request payload for opening an organ request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    /// One of `heart`, `kidney`, `liver`, `lung`, `pancreas`, or `cornea`.
    pub organ: String,
    /// Clinical urgency, 1 (lowest) to 5 (highest).
    pub urgency: u8,
    pub medical_condition: String,
}

/// Request payload for approving or rejecting a request.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestBody {
    pub notes: Option<String>,
}

/// Query parameters for the pending request listing.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequestsQuery {
    pub organ: String,
}

/// Organ request representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganRequestBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub patient_id: String,
    pub organ: String,
    pub urgency: u8,
    pub medical_condition: String,
    pub status: String,
    #[schema(format = "uuid")]
    pub matched_donation_id: Option<String>,
    pub doctor_notes: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<OrganRequest> for OrganRequestBody {
    fn from(value: OrganRequest) -> Self {
        Self {
            id: value.id().to_string(),
            patient_id: value.patient_id().to_string(),
            organ: value.organ().to_string(),
            urgency: value.urgency().get(),
            medical_condition: value.medical_condition().to_owned(),
            status: value.status().to_string(),
            matched_donation_id: value.matched_donation_id().map(|id| id.to_string()),
            doctor_notes: value.doctor_notes().map(str::to_owned),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// Open an organ request for the authenticated patient.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestBody,
    responses(
        (status = 200, description = "Request opened", body = OrganRequestBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["requests"],
    operation_id = "createRequest",
    security(("SessionCookie" = []))
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<web::Json<OrganRequestBody>> {
    let actor_id = session.require_participant_id()?;
    let payload = payload.into_inner();
    let organ = parse_organ(payload.organ, FieldName::new("organ"))?;
    let urgency = parse_urgency(payload.urgency, FieldName::new("urgency"))?;

    let request = state
        .allocation
        .create_request(CreateRequestCommand {
            actor_id,
            organ,
            urgency,
            medical_condition: payload.medical_condition,
        })
        .await?;

    Ok(web::Json(OrganRequestBody::from(request)))
}

/// Fetch an organ request by id.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = uuid::Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request found", body = OrganRequestBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Request not found", body = Error)
    ),
    tags = ["requests"],
    operation_id = "getRequest",
    security(("SessionCookie" = []))
)]
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrganRequestBody>> {
    let request_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let request = state.allocation_query.get_request(request_id).await?;

    Ok(web::Json(OrganRequestBody::from(request)))
}

/// List pending requests for an organ type, most urgent first.
#[utoipa::path(
    get,
    path = "/api/v1/requests/pending",
    params(("organ" = String, Query, description = "Organ type to filter by")),
    responses(
        (status = 200, description = "Pending requests", body = [OrganRequestBody]),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["requests"],
    operation_id = "listPendingRequests",
    security(("SessionCookie" = []))
)]
#[get("/requests/pending")]
pub async fn list_pending_requests(
    state: web::Data<HttpState>,
    query: web::Query<PendingRequestsQuery>,
) -> ApiResult<web::Json<Vec<OrganRequestBody>>> {
    let organ = parse_organ(query.into_inner().organ, FieldName::new("organ"))?;

    let requests = state
        .allocation_query
        .list_pending_requests(organ)
        .await?;

    Ok(web::Json(
        requests.into_iter().map(OrganRequestBody::from).collect(),
    ))
}

/// Approve a pending request. Doctors and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/approve",
    params(("id" = uuid::Uuid, Path, description = "Request id")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Request approved", body = OrganRequestBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Request not found", body = Error),
        (status = 409, description = "Request is not pending", body = Error)
    ),
    tags = ["requests"],
    operation_id = "approveRequest",
    security(("SessionCookie" = []))
)]
#[post("/requests/{id}/approve")]
pub async fn approve_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<OrganRequestBody>> {
    let actor_id = session.require_participant_id()?;
    let request_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let request = state
        .allocation
        .approve_request(ReviewRequestCommand {
            actor_id,
            request_id,
            notes: payload.into_inner().notes,
        })
        .await?;

    Ok(web::Json(OrganRequestBody::from(request)))
}

/// Reject a pending or approved request. Doctors and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/reject",
    params(("id" = uuid::Uuid, Path, description = "Request id")),
    request_body = ReviewRequestBody,
    responses(
        (status = 200, description = "Request rejected", body = OrganRequestBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Request not found", body = Error),
        (status = 409, description = "Request is already settled", body = Error)
    ),
    tags = ["requests"],
    operation_id = "rejectRequest",
    security(("SessionCookie" = []))
)]
#[post("/requests/{id}/reject")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequestBody>,
) -> ApiResult<web::Json<OrganRequestBody>> {
    let actor_id = session.require_participant_id()?;
    let request_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let request = state
        .allocation
        .reject_request(ReviewRequestCommand {
            actor_id,
            request_id,
            notes: payload.into_inner().notes,
        })
        .await?;

    Ok(web::Json(OrganRequestBody::from(request)))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
