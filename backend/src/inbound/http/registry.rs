//! Registry-wide read endpoints.
//!
//! ```text
//! GET /api/v1/live-organs
//! GET /api/v1/stats
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RegistryStats;
use crate::domain::{Error, LiveOrganView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Available organ representation returned by the live map endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LiveOrganBody {
    #[schema(format = "uuid")]
    pub donation_id: String,
    pub organ: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(format = "date-time")]
    pub viable_until: Option<String>,
}

impl From<LiveOrganView> for LiveOrganBody {
    fn from(value: LiveOrganView) -> Self {
        Self {
            donation_id: value.donation_id.to_string(),
            organ: value.organ.to_string(),
            latitude: value.latitude,
            longitude: value.longitude,
            viable_until: value.viable_until.map(|at| at.to_rfc3339()),
        }
    }
}

/// Registry-wide counters returned by the stats endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStatsBody {
    pub participants: u64,
    pub requests: u64,
    pub donations: u64,
    pub matched: u64,
    pub completed: u64,
}

impl From<RegistryStats> for RegistryStatsBody {
    fn from(value: RegistryStats) -> Self {
        Self {
            participants: value.participants,
            requests: value.requests,
            donations: value.donations,
            matched: value.matched,
            completed: value.completed,
        }
    }
}

/// List every donation currently available for matching.
#[utoipa::path(
    get,
    path = "/api/v1/live-organs",
    responses(
        (status = 200, description = "Available organs", body = [LiveOrganBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["registry"],
    operation_id = "listLiveOrgans",
    security([])
)]
#[get("/live-organs")]
pub async fn list_live_organs(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<LiveOrganBody>>> {
    let organs = state.allocation_query.list_live_organs().await?;

    Ok(web::Json(
        organs.into_iter().map(LiveOrganBody::from).collect(),
    ))
}

/// Report registry-wide counters.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Registry counters", body = RegistryStatsBody),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["registry"],
    operation_id = "registryStats",
    security([])
)]
#[get("/stats")]
pub async fn registry_stats(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<RegistryStatsBody>> {
    let stats = state.allocation_query.registry_stats().await?;

    Ok(web::Json(RegistryStatsBody::from(stats)))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
