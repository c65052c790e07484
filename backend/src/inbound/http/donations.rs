//! Organ donation HTTP handlers.
//!
//! ```text
//! POST /api/v1/donations
//! GET  /api/v1/donations/{id}
//! POST /api/v1/donations/{id}/verify
//! POST /api/v1/donations/{id}/release
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CreateDonationCommand, ReleaseDonationCommand, VerifyDonationCommand,
};
use crate::domain::{Error, OrganDonation};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_rfc3339_timestamp, parse_organ, parse_uuid,
};

/// Request payload for recording a donation offer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationBody {
    /// One of `heart`, `kidney`, `liver`, `lung`, `pancreas`, or `cornea`.
    pub organ: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// RFC 3339 deadline after which the organ is no longer viable.
    #[schema(format = "date-time")]
    pub viable_until: Option<String>,
}

/// Request payload for granting medical clearance.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDonationBody {
    pub notes: Option<String>,
}

/// Organ donation representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganDonationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub donor_id: String,
    pub organ: String,
    pub status: String,
    pub medical_clearance: bool,
    pub clearance_notes: Option<String>,
    #[schema(format = "uuid")]
    pub matched_request_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(format = "date-time")]
    pub viable_until: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<OrganDonation> for OrganDonationBody {
    fn from(value: OrganDonation) -> Self {
        Self {
            id: value.id().to_string(),
            donor_id: value.donor_id().to_string(),
            organ: value.organ().to_string(),
            status: value.status().to_string(),
            medical_clearance: value.medical_clearance(),
            clearance_notes: value.clearance_notes().map(str::to_owned),
            matched_request_id: value.matched_request_id().map(|id| id.to_string()),
            latitude: value.latitude(),
            longitude: value.longitude(),
            viable_until: value.viable_until().map(|at| at.to_rfc3339()),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// Record a donation offer for the authenticated donor.
#[utoipa::path(
    post,
    path = "/api/v1/donations",
    request_body = CreateDonationBody,
    responses(
        (status = 200, description = "Donation recorded", body = OrganDonationBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["donations"],
    operation_id = "createDonation",
    security(("SessionCookie" = []))
)]
#[post("/donations")]
pub async fn create_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDonationBody>,
) -> ApiResult<web::Json<OrganDonationBody>> {
    let actor_id = session.require_participant_id()?;
    let payload = payload.into_inner();
    let organ = parse_organ(payload.organ, FieldName::new("organ"))?;
    let viable_until =
        parse_optional_rfc3339_timestamp(payload.viable_until, FieldName::new("viableUntil"))?;

    let donation = state
        .allocation
        .create_donation(CreateDonationCommand {
            actor_id,
            organ,
            latitude: payload.latitude,
            longitude: payload.longitude,
            viable_until,
        })
        .await?;

    Ok(web::Json(OrganDonationBody::from(donation)))
}

/// Fetch an organ donation by id.
#[utoipa::path(
    get,
    path = "/api/v1/donations/{id}",
    params(("id" = uuid::Uuid, Path, description = "Donation id")),
    responses(
        (status = 200, description = "Donation found", body = OrganDonationBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Donation not found", body = Error)
    ),
    tags = ["donations"],
    operation_id = "getDonation",
    security(("SessionCookie" = []))
)]
#[get("/donations/{id}")]
pub async fn get_donation(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrganDonationBody>> {
    let donation_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let donation = state.allocation_query.get_donation(donation_id).await?;

    Ok(web::Json(OrganDonationBody::from(donation)))
}

/// Grant medical clearance to a pending donation. Doctors and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/donations/{id}/verify",
    params(("id" = uuid::Uuid, Path, description = "Donation id")),
    request_body = VerifyDonationBody,
    responses(
        (status = 200, description = "Donation verified", body = OrganDonationBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Donation not found", body = Error),
        (status = 409, description = "Donation is not pending", body = Error)
    ),
    tags = ["donations"],
    operation_id = "verifyDonation",
    security(("SessionCookie" = []))
)]
#[post("/donations/{id}/verify")]
pub async fn verify_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VerifyDonationBody>,
) -> ApiResult<web::Json<OrganDonationBody>> {
    let actor_id = session.require_participant_id()?;
    let donation_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let donation = state
        .allocation
        .verify_donation(VerifyDonationCommand {
            actor_id,
            donation_id,
            notes: payload.into_inner().notes,
        })
        .await?;

    Ok(web::Json(OrganDonationBody::from(donation)))
}

/// Publish a verified donation as available. Doctors and admins only.
#[utoipa::path(
    post,
    path = "/api/v1/donations/{id}/release",
    params(("id" = uuid::Uuid, Path, description = "Donation id")),
    responses(
        (status = 200, description = "Donation released", body = OrganDonationBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Donation not found", body = Error),
        (status = 409, description = "Donation is not verified", body = Error)
    ),
    tags = ["donations"],
    operation_id = "releaseDonation",
    security(("SessionCookie" = []))
)]
#[post("/donations/{id}/release")]
pub async fn release_donation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrganDonationBody>> {
    let actor_id = session.require_participant_id()?;
    let donation_id = parse_uuid(path.into_inner(), FieldName::new("id"))?;

    let donation = state
        .allocation
        .release_donation(ReleaseDonationCommand {
            actor_id,
            donation_id,
        })
        .await?;

    Ok(web::Json(OrganDonationBody::from(donation)))
}

#[cfg(test)]
#[path = "donations_tests.rs"]
mod tests;
