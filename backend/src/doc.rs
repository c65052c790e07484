//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the request
//! and response schemas, and the session cookie security scheme.
//!
//! The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::donations::{CreateDonationBody, OrganDonationBody, VerifyDonationBody};
use crate::inbound::http::ledger::{LedgerEntryBody, RecordTransactionBody};
use crate::inbound::http::matching::{MatchOrgansBody, MatchOutcomeBody};
use crate::inbound::http::participants::{
    LoginBody, ParticipantBody, RegisterParticipantBody, SetVerifiedBody,
};
use crate::inbound::http::registry::{LiveOrganBody, RegistryStatsBody};
use crate::inbound::http::requests::{CreateRequestBody, OrganRequestBody, ReviewRequestBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/participants or POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Transplant registry API",
        description = "HTTP interface for participant registration, organ \
            requests and donations, matching, and the audit ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::participants::register_participant,
        crate::inbound::http::participants::login,
        crate::inbound::http::participants::get_participant,
        crate::inbound::http::participants::set_participant_verification,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::list_pending_requests,
        crate::inbound::http::requests::get_request,
        crate::inbound::http::requests::approve_request,
        crate::inbound::http::requests::reject_request,
        crate::inbound::http::donations::create_donation,
        crate::inbound::http::donations::get_donation,
        crate::inbound::http::donations::verify_donation,
        crate::inbound::http::donations::release_donation,
        crate::inbound::http::matching::match_organs,
        crate::inbound::http::matching::complete_transplant,
        crate::inbound::http::ledger::record_transaction,
        crate::inbound::http::ledger::list_ledger_entries,
        crate::inbound::http::registry::list_live_organs,
        crate::inbound::http::registry::registry_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterParticipantBody,
        LoginBody,
        SetVerifiedBody,
        ParticipantBody,
        CreateRequestBody,
        ReviewRequestBody,
        OrganRequestBody,
        CreateDonationBody,
        VerifyDonationBody,
        OrganDonationBody,
        MatchOrgansBody,
        MatchOutcomeBody,
        RecordTransactionBody,
        LedgerEntryBody,
        LiveOrganBody,
        RegistryStatsBody,
    )),
    tags(
        (name = "participants", description = "Registration, login, and verification"),
        (name = "requests", description = "Organ requests and their adjudication"),
        (name = "donations", description = "Donation offers and their clearance"),
        (name = "matching", description = "Matching requests to donations"),
        (name = "ledger", description = "Append-only audit ledger"),
        (name = "registry", description = "Registry-wide read endpoints"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
